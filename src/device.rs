//! The attached sensor as seen by the owning layer
//!
//! A [`DepthDevice`] is built from the two generators the session hands over.
//! Attaching applies the variant's profile and default modes; any failure
//! aborts the attach so no partially configured device escapes.

use crate::capability::CapabilityPolicy;
use crate::config::DriverConfig;
use crate::controller::{lock, StreamController};
use crate::decoder::{decoder_for, DebayeringMethod, DecodedImage, FrameDecoder};
use crate::errors::{DeviceConfigError, DeviceResult, UnsupportedOperationError};
use crate::modes::ModeCatalog;
use crate::profile::DeviceProfile;
use crate::sdk::{DepthGenerator, FrameCallback, Generator};
use crate::types::{RawFrame, StreamKind, StreamMode, Variant};
use std::sync::{Arc, Mutex};

/// Receives decoded image frames on the SDK's callback thread
pub type ImageListener = Arc<dyn Fn(DecodedImage) + Send + Sync>;
/// Receives raw depth frames on the SDK's callback thread
pub type DepthListener = Arc<dyn Fn(RawFrame) + Send + Sync>;

pub struct DepthDevice {
    profile: DeviceProfile,
    catalog: ModeCatalog,
    policy: CapabilityPolicy,
    decoder: Arc<dyn FrameDecoder>,
    controller: StreamController,
    image_listener: Arc<Mutex<Option<ImageListener>>>,
    depth_listener: Arc<Mutex<Option<DepthListener>>>,
}

impl DepthDevice {
    /// Attach with the default Bayer decoding method
    pub fn attach(
        variant: Variant,
        image: Box<dyn Generator>,
        depth: Box<dyn DepthGenerator>,
    ) -> Result<Self, DeviceConfigError> {
        Self::attach_with_debayering(variant, image, depth, DebayeringMethod::default())
    }

    pub fn attach_with_debayering(
        variant: Variant,
        image: Box<dyn Generator>,
        depth: Box<dyn DepthGenerator>,
        debayering: DebayeringMethod,
    ) -> Result<Self, DeviceConfigError> {
        let decoder = decoder_for(variant, debayering);
        let policy = CapabilityPolicy::new(variant, decoder.clone());
        let controller = StreamController::new(image, depth, policy.cycles_registration_on_start());
        let profile = DeviceProfile::for_variant(variant);
        let catalog = ModeCatalog::for_variant(variant);

        profile.configure(&controller)?;
        for kind in [StreamKind::Depth, StreamKind::Image] {
            controller.set_output_mode(kind, catalog.default_mode(kind))?;
        }

        log::info!("Attached {} device", variant.display_name());
        Ok(Self {
            profile,
            catalog,
            policy,
            decoder,
            controller,
            image_listener: Arc::new(Mutex::new(None)),
            depth_listener: Arc::new(Mutex::new(None)),
        })
    }

    /// Attach and then apply the startup settings from `config`
    pub fn attach_with_config(
        variant: Variant,
        image: Box<dyn Generator>,
        depth: Box<dyn DepthGenerator>,
        config: &DriverConfig,
    ) -> DeviceResult<Self> {
        let device =
            Self::attach_with_debayering(variant, image, depth, config.decoding.debayering)?;
        device.apply_config(config)?;
        Ok(device)
    }

    pub fn apply_config(&self, config: &DriverConfig) -> DeviceResult<()> {
        if let Some(mode) = config.device.depth_mode {
            self.set_output_mode(StreamKind::Depth, mode)?;
        }
        if let Some(mode) = config.device.image_mode {
            self.set_output_mode(StreamKind::Image, mode)?;
        }
        self.set_depth_registration(config.device.depth_registration)?;
        self.set_synchronization(config.device.synchronization)?;
        Ok(())
    }

    pub fn variant(&self) -> Variant {
        self.profile.variant
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    // Modes

    pub fn available_modes(&self, kind: StreamKind) -> &[StreamMode] {
        self.catalog.available_modes(kind)
    }

    pub fn default_mode(&self, kind: StreamKind) -> StreamMode {
        self.catalog.default_mode(kind)
    }

    pub fn output_mode(&self, kind: StreamKind) -> StreamMode {
        self.controller
            .output_mode(kind)
            .unwrap_or_else(|| self.catalog.default_mode(kind))
    }

    /// Only modes from this variant's catalog are accepted
    pub fn set_output_mode(&self, kind: StreamKind, mode: StreamMode) -> Result<(), DeviceConfigError> {
        if !self.catalog.supports(kind, &mode) {
            return Err(DeviceConfigError::new(
                "MapOutputMode",
                mode,
                format!(
                    "{} does not offer this {} mode",
                    self.variant().display_name(),
                    kind
                ),
            ));
        }
        self.controller.set_output_mode(kind, mode)
    }

    // Streams

    pub fn start_image_stream(&self) -> Result<(), DeviceConfigError> {
        self.controller.start_image(self.image_callback())
    }

    pub fn stop_image_stream(&self) -> Result<(), DeviceConfigError> {
        self.controller.stop_image()
    }

    pub fn start_depth_stream(&self) -> Result<(), DeviceConfigError> {
        self.controller.start_depth(self.depth_callback())
    }

    pub fn stop_depth_stream(&self) -> Result<(), DeviceConfigError> {
        self.controller.stop_depth()
    }

    pub fn is_image_stream_running(&self) -> bool {
        self.controller.is_running(StreamKind::Image)
    }

    pub fn is_depth_stream_running(&self) -> bool {
        self.controller.is_running(StreamKind::Depth)
    }

    pub fn set_image_listener(&self, listener: impl Fn(DecodedImage) + Send + Sync + 'static) {
        let listener: ImageListener = Arc::new(listener);
        *lock(&self.image_listener) = Some(listener);
    }

    pub fn set_depth_listener(&self, listener: impl Fn(RawFrame) + Send + Sync + 'static) {
        let listener: DepthListener = Arc::new(listener);
        *lock(&self.depth_listener) = Some(listener);
    }

    fn image_callback(&self) -> FrameCallback {
        let decoder = self.decoder.clone();
        let listener = self.image_listener.clone();
        Arc::new(move |frame: RawFrame| {
            let current = lock(&listener).clone();
            if let Some(listener) = current {
                listener(decoder.decode(frame));
            }
        })
    }

    fn depth_callback(&self) -> FrameCallback {
        let listener = self.depth_listener.clone();
        Arc::new(move |frame: RawFrame| {
            let current = lock(&listener).clone();
            if let Some(listener) = current {
                listener(frame);
            }
        })
    }

    /// Decode a raw image frame with this variant's decoder
    pub fn current_image(&self, frame: RawFrame) -> DecodedImage {
        self.decoder.decode(frame)
    }

    // Registration

    pub fn is_depth_registration_supported(&self) -> bool {
        self.controller.is_registration_supported()
    }

    pub fn is_depth_registered(&self) -> bool {
        self.controller.is_depth_registered()
    }

    pub fn set_depth_registration(&self, registered: bool) -> DeviceResult<()> {
        if registered && !self.is_depth_registration_supported() {
            return Err(UnsupportedOperationError::new(self.variant(), "depth registration").into());
        }
        self.controller.set_depth_registration(registered)?;
        Ok(())
    }

    // Capabilities

    pub fn is_synchronization_supported(&self) -> bool {
        self.policy.is_synchronization_supported()
    }

    pub fn is_synchronized(&self) -> bool {
        self.policy.is_synchronization_supported() && self.controller.is_synchronized()
    }

    pub fn set_synchronization(&self, enable: bool) -> DeviceResult<()> {
        self.policy.check_synchronization(enable)?;
        if self.policy.is_synchronization_supported() {
            self.controller.set_frame_sync(enable)?;
        }
        Ok(())
    }

    pub fn is_depth_cropping_supported(&self) -> bool {
        self.policy.is_depth_cropping_supported()
    }

    pub fn is_depth_cropped(&self) -> bool {
        self.policy.is_depth_cropping_supported() && self.controller.cropping().is_some()
    }

    pub fn set_depth_cropping(&self, x: u32, y: u32, width: u32, height: u32) -> DeviceResult<()> {
        let cropping = self.policy.check_depth_cropping(x, y, width, height)?;
        if self.policy.is_depth_cropping_supported() {
            self.controller.set_cropping(cropping)?;
        }
        Ok(())
    }

    pub fn is_image_resize_supported(
        &self,
        input_width: u32,
        input_height: u32,
        output_width: u32,
        output_height: u32,
    ) -> bool {
        self.policy
            .is_image_resize_supported(input_width, input_height, output_width, output_height)
    }

    /// Stop both streams, reset registration and drop all subscriptions.
    ///
    /// Also runs on drop; repeated calls are no-ops.
    pub fn teardown(&self) {
        self.controller.teardown();
        log::debug!("Released {} device", self.variant().display_name());
    }
}

impl Drop for DepthDevice {
    fn drop(&mut self) {
        self.teardown();
    }
}

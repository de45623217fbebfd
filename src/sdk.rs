//! Boundary to the vendor sensor SDK
//!
//! The session/context that discovers nodes and owns the SDK handles lives
//! outside this crate. It hands each device one image generator and one depth
//! generator implementing these traits.

use crate::types::{Cropping, PixelFormat, RawFrame, StreamMode};
use std::sync::Arc;
use thiserror::Error;

/// Non-OK status returned by an SDK call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {code:#x})")]
pub struct SdkStatus {
    pub code: u32,
    pub message: String,
}

impl SdkStatus {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkStatus>;

/// Opaque token for a registered frame-ready callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub u64);

/// Invoked on an SDK thread whenever a generator has new data
pub type FrameCallback = Arc<dyn Fn(RawFrame) + Send + Sync>;

/// A single stream's producer of raw samples
pub trait Generator: Send {
    fn set_int_property(&mut self, name: &str, value: i64) -> SdkResult<()>;

    fn set_pixel_format(&mut self, format: PixelFormat) -> SdkResult<()>;

    fn set_map_output_mode(&mut self, mode: StreamMode) -> SdkResult<()>;

    fn register_for_new_data(&mut self, callback: FrameCallback) -> SdkResult<SubscriptionHandle>;

    /// After this returns the callback registered under `handle` never fires again.
    fn unregister_from_new_data(&mut self, handle: SubscriptionHandle);

    fn start_generating(&mut self) -> SdkResult<()>;

    fn stop_generating(&mut self) -> SdkResult<()>;

    fn is_generating(&self) -> bool;
}

/// Depth generator capabilities on top of the common generator calls
pub trait DepthGenerator: Generator {
    /// Whether the alternative-viewpoint capability is present
    fn is_registration_supported(&self) -> bool;

    /// Remap depth into the image generator's viewpoint (`true`) or reset it
    fn set_view_point(&mut self, registered: bool) -> SdkResult<()>;

    fn set_frame_sync(&mut self, enabled: bool) -> SdkResult<()>;

    fn set_cropping(&mut self, cropping: Option<Cropping>) -> SdkResult<()>;
}

//! Per-variant optional feature policy

use crate::decoder::FrameDecoder;
use crate::errors::UnsupportedOperationError;
use crate::types::{Cropping, Variant};
use std::sync::Arc;

/// Which optional features a variant has, and the gate that rejects the rest
#[derive(Clone)]
pub struct CapabilityPolicy {
    variant: Variant,
    synchronization: bool,
    depth_cropping: bool,
    cycle_registration_on_start: bool,
    decoder: Arc<dyn FrameDecoder>,
}

impl CapabilityPolicy {
    pub fn new(variant: Variant, decoder: Arc<dyn FrameDecoder>) -> Self {
        let hardware_features = matches!(variant, Variant::PrimeSense);
        Self {
            variant,
            synchronization: hardware_features,
            depth_cropping: hardware_features,
            cycle_registration_on_start: hardware_features,
            decoder,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn is_synchronization_supported(&self) -> bool {
        self.synchronization
    }

    pub fn is_depth_cropping_supported(&self) -> bool {
        self.depth_cropping
    }

    /// Whether stream starts need the registration cycling workaround
    pub fn cycles_registration_on_start(&self) -> bool {
        self.cycle_registration_on_start
    }

    /// Disabling always passes; enabling needs hardware support.
    pub fn check_synchronization(&self, enable: bool) -> Result<(), UnsupportedOperationError> {
        if enable && !self.synchronization {
            return Err(UnsupportedOperationError::new(
                self.variant,
                "hardware synchronization",
            ));
        }
        Ok(())
    }

    /// A zero width or height disables cropping and always passes.
    pub fn check_depth_cropping(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Option<Cropping>, UnsupportedOperationError> {
        let cropping = Cropping::requested(x, y, width, height);
        if cropping.is_some() && !self.depth_cropping {
            return Err(UnsupportedOperationError::new(
                self.variant,
                "cropping for the depth stream",
            ));
        }
        Ok(cropping)
    }

    pub fn is_image_resize_supported(
        &self,
        input_width: u32,
        input_height: u32,
        output_width: u32,
        output_height: u32,
    ) -> bool {
        self.decoder
            .resizing_supported(input_width, input_height, output_width, output_height)
    }
}

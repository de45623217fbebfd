//! Attach-time generator configuration per sensor variant

use crate::controller::StreamController;
use crate::errors::DeviceConfigError;
use crate::types::{PixelFormat, Variant};

pub const INPUT_FORMAT_PROPERTY: &str = "InputFormat";
pub const REGISTRATION_TYPE_PROPERTY: &str = "RegistrationType";

/// Uncompressed YUV-422 sensor input
pub const INPUT_FORMAT_UNCOMPRESSED_YUV422: i64 = 5;
/// Uncompressed 8-bit Bayer sensor input
pub const INPUT_FORMAT_UNCOMPRESSED_BAYER: i64 = 6;

pub const REGISTRATION_HARDWARE: i64 = 1;
pub const REGISTRATION_SOFTWARE: i64 = 2;

/// Low-level constants a variant needs applied before any stream starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub variant: Variant,
    pub image_input_format: i64,
    pub image_pixel_format: PixelFormat,
    pub registration_type: i64,
}

impl DeviceProfile {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            // Grayscale output bypasses debayering, so frames arrive as the raw mosaic
            Variant::Kinect => Self {
                variant,
                image_input_format: INPUT_FORMAT_UNCOMPRESSED_BAYER,
                image_pixel_format: PixelFormat::Grayscale8,
                registration_type: REGISTRATION_SOFTWARE,
            },
            Variant::PrimeSense => Self {
                variant,
                image_input_format: INPUT_FORMAT_UNCOMPRESSED_YUV422,
                image_pixel_format: PixelFormat::Yuv422,
                registration_type: REGISTRATION_HARDWARE,
            },
        }
    }

    /// Apply the profile: image input encoding and pixel format under the
    /// image lock, then the registration type under the depth lock.
    pub fn configure(&self, controller: &StreamController) -> Result<(), DeviceConfigError> {
        controller.with_image_generator(|image| {
            image
                .set_int_property(INPUT_FORMAT_PROPERTY, self.image_input_format)
                .map_err(|status| {
                    DeviceConfigError::new(INPUT_FORMAT_PROPERTY, self.image_input_format, status)
                })?;
            image
                .set_pixel_format(self.image_pixel_format)
                .map_err(|status| {
                    DeviceConfigError::new(
                        "PixelFormat",
                        format!("{:?}", self.image_pixel_format),
                        status,
                    )
                })
        })?;

        controller.with_depth_generator(|depth| {
            depth
                .set_int_property(REGISTRATION_TYPE_PROPERTY, self.registration_type)
                .map_err(|status| {
                    DeviceConfigError::new(REGISTRATION_TYPE_PROPERTY, self.registration_type, status)
                })
        })?;

        log::debug!(
            "Configured {} profile: input format {}, pixel format {:?}, registration type {}",
            self.variant,
            self.image_input_format,
            self.image_pixel_format,
            self.registration_type
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGenerator, SdkCall};

    #[test]
    fn test_kinect_profile_sequence() {
        let (image, depth, log) = FakeGenerator::pair();
        let controller = StreamController::new(Box::new(image), Box::new(depth), false);
        DeviceProfile::for_variant(Variant::Kinect)
            .configure(&controller)
            .unwrap();

        assert_eq!(
            log.calls(),
            vec![
                SdkCall::image_int("InputFormat", 6),
                SdkCall::image_pixel_format(PixelFormat::Grayscale8),
                SdkCall::depth_int("RegistrationType", 2),
            ]
        );
    }

    #[test]
    fn test_primesense_profile_sequence() {
        let (image, depth, log) = FakeGenerator::pair();
        let controller = StreamController::new(Box::new(image), Box::new(depth), true);
        DeviceProfile::for_variant(Variant::PrimeSense)
            .configure(&controller)
            .unwrap();

        assert_eq!(
            log.calls(),
            vec![
                SdkCall::image_int("InputFormat", 5),
                SdkCall::image_pixel_format(PixelFormat::Yuv422),
                SdkCall::depth_int("RegistrationType", 1),
            ]
        );
    }

    #[test]
    fn test_failure_carries_property_value_and_status() {
        let (image, depth, log) = FakeGenerator::pair();
        image.fail_on("set_pixel_format");
        let controller = StreamController::new(Box::new(image), Box::new(depth), false);

        let err = DeviceProfile::for_variant(Variant::Kinect)
            .configure(&controller)
            .unwrap_err();
        assert_eq!(err.property, "PixelFormat");
        assert_eq!(err.value, "Grayscale8");
        assert!(err.status.contains("injected failure"));
        // depth lock section never runs after an image failure
        assert_eq!(log.calls().len(), 2);
        assert!(!log.calls().iter().any(|c| c.is_depth()));
    }
}

use crabdepth::config::DriverConfig;
use crabdepth::decoder::{DebayeringMethod, ImageEncoding};
use crabdepth::errors::DeviceError;
use crabdepth::testing::FakeGenerator;
use crabdepth::types::RawFrame;
use crabdepth::{DepthDevice, StreamKind, StreamMode, Variant};
use tempfile::tempdir;

#[test]
fn test_config_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("crabdepth.toml");

    let mut config = DriverConfig::default();
    config.device.depth_registration = true;
    config.device.depth_mode = Some(StreamMode::qvga(60));
    config.decoding.debayering = DebayeringMethod::Bilinear;

    config.save_to_file(&path).unwrap();
    let loaded = DriverConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_file_is_a_settings_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[device\nimage_mode = ").unwrap();

    let err = DriverConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, DeviceError::Settings(_)));
}

#[test]
fn test_zero_frame_rate_is_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zero.toml");
    std::fs::write(
        &path,
        "[device.depth_mode]\nwidth = 640\nheight = 480\nframe_rate = 0\n",
    )
    .unwrap();

    assert!(DriverConfig::load_from_file(&path).is_err());
}

#[test]
fn test_attach_with_config_applies_settings() {
    let mut config = DriverConfig::default();
    config.device.depth_registration = true;
    config.device.synchronization = true;
    config.device.image_mode = Some(StreamMode::qvga(30));

    let (image, depth, _) = FakeGenerator::pair();
    let device =
        DepthDevice::attach_with_config(Variant::PrimeSense, Box::new(image), Box::new(depth), &config)
            .unwrap();

    assert!(device.is_depth_registered());
    assert!(device.is_synchronized());
    assert_eq!(device.output_mode(StreamKind::Image), StreamMode::qvga(30));
    assert_eq!(device.output_mode(StreamKind::Depth), StreamMode::vga(30));
}

#[test]
fn test_attach_with_config_uses_debayering_method() {
    let mut config = DriverConfig::default();
    config.decoding.debayering = DebayeringMethod::EdgeAware;

    let (image, depth, _) = FakeGenerator::pair();
    let device =
        DepthDevice::attach_with_config(Variant::Kinect, Box::new(image), Box::new(depth), &config)
            .unwrap();

    let decoded = device.current_image(RawFrame::new(1, 640, 480, vec![0; 640 * 480]));
    assert_eq!(decoded.encoding, ImageEncoding::BayerGrbg(DebayeringMethod::EdgeAware));
}

#[test]
fn test_kinect_config_requesting_sync_fails() {
    let mut config = DriverConfig::default();
    config.device.synchronization = true;

    let (image, depth, _) = FakeGenerator::pair();
    let result =
        DepthDevice::attach_with_config(Variant::Kinect, Box::new(image), Box::new(depth), &config);
    assert!(matches!(result, Err(DeviceError::Unsupported(_))));
}

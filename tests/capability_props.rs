//! Property-Based Tests for mode catalogs and capability gating
//!
//! Run with: cargo test --test capability_props

use crabdepth::errors::DeviceError;
use crabdepth::testing::FakeGenerator;
use crabdepth::{DepthDevice, StreamKind, Variant};
use proptest::prelude::*;

fn variant_strategy() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::Kinect), Just(Variant::PrimeSense)]
}

fn kind_strategy() -> impl Strategy<Value = StreamKind> {
    prop_oneof![Just(StreamKind::Image), Just(StreamKind::Depth)]
}

fn attach(variant: Variant) -> DepthDevice {
    let (image, depth, _) = FakeGenerator::pair();
    DepthDevice::attach(variant, Box::new(image), Box::new(depth)).expect("attach should succeed")
}

proptest! {
    /// INVARIANT: the default mode is always the first catalog entry
    #[test]
    fn default_mode_is_first_entry(variant in variant_strategy(), kind in kind_strategy()) {
        let device = attach(variant);
        prop_assert_eq!(device.default_mode(kind), device.available_modes(kind)[0]);
    }

    /// INVARIANT: Kinect rejects any cropping window with a non-zero area
    #[test]
    fn kinect_rejects_any_crop_window(
        x in 0u32..640,
        y in 0u32..480,
        width in 1u32..640,
        height in 1u32..480,
    ) {
        let device = attach(Variant::Kinect);
        let result = device.set_depth_cropping(x, y, width, height);
        prop_assert!(matches!(result, Err(DeviceError::Unsupported(_))));
        prop_assert!(!device.is_depth_cropped());
    }

    /// INVARIANT: a zero width or height disables cropping on every variant
    #[test]
    fn zero_area_crop_always_succeeds(
        variant in variant_strategy(),
        x in 0u32..640,
        y in 0u32..480,
        extent in 0u32..640,
        zero_width in any::<bool>(),
    ) {
        let device = attach(variant);
        let (width, height) = if zero_width { (0, extent) } else { (extent, 0) };
        prop_assert!(device.set_depth_cropping(x, y, width, height).is_ok());
        prop_assert!(!device.is_depth_cropped());
    }

    /// INVARIANT: any catalog mode can be applied and read back
    #[test]
    fn catalog_modes_are_accepted(
        variant in variant_strategy(),
        kind in kind_strategy(),
        index in 0usize..8,
    ) {
        let device = attach(variant);
        let modes = device.available_modes(kind).to_vec();
        let mode = modes[index % modes.len()];
        prop_assert!(device.set_output_mode(kind, mode).is_ok());
        prop_assert_eq!(device.output_mode(kind), mode);
    }

    /// INVARIANT: the final registration state equals the last request,
    /// whatever order the streams are started in
    #[test]
    fn registration_survives_any_start_order(
        variant in variant_strategy(),
        registered in any::<bool>(),
        depth_first in any::<bool>(),
    ) {
        let device = attach(variant);
        device.set_depth_registration(registered).unwrap();
        if depth_first {
            device.start_depth_stream().unwrap();
            device.start_image_stream().unwrap();
        } else {
            device.start_image_stream().unwrap();
            device.start_depth_stream().unwrap();
        }
        prop_assert_eq!(device.is_depth_registered(), registered);
        prop_assert!(device.is_depth_stream_running());
        prop_assert!(device.is_image_stream_running());
    }
}

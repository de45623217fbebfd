//! CrabDepth: driver-layer adapter for Kinect and PrimeSense depth cameras
//!
//! This crate configures the two sensor families on top of a shared vendor
//! sensor SDK and sequences stream startup so hardware-specific faults are
//! avoided.
//!
//! # Features
//! - Per-variant attach-time configuration (input encoding, registration type)
//! - Fixed per-variant stream mode catalogs with default mode selection
//! - Capability gating for hardware synchronization and depth cropping
//! - Registration cycling around stream starts for PrimeSense hardware
//! - Race-free stream teardown that never fires a callback after unsubscribe
//!
//! # Usage
//! ```rust,ignore
//! use crabdepth::{DepthDevice, StreamKind, Variant};
//!
//! // `image` and `depth` come from the SDK session that discovered the sensor
//! let device = DepthDevice::attach(Variant::PrimeSense, image, depth)?;
//! device.set_depth_registration(true)?;
//! device.start_depth_stream()?;
//! device.start_image_stream()?;
//! assert!(device.is_depth_registered());
//! ```
pub mod capability;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod device;
pub mod errors;
pub mod modes;
pub mod profile;
pub mod sdk;
pub mod types;

// Testing utilities - in-memory SDK fake for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::DriverConfig;
pub use device::DepthDevice;
pub use errors::{DeviceConfigError, DeviceError, UnsupportedOperationError};
pub use sdk::{DepthGenerator, Generator};
pub use types::{StreamKind, StreamMode, Variant};

/// Initialize logging for the driver
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "crabdepth=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        variants: Variant::all().to_vec(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub variants: Vec<Variant>,
}

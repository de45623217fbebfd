//! Testing utilities for crabdepth
//!
//! Provides an in-memory stand-in for the sensor SDK so the attach sequence
//! and the stream start/stop ordering can be verified without hardware.

pub mod fake_sdk;

pub use fake_sdk::{CallLog, FakeGenerator, SdkCall, SdkOp};

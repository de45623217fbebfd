use crate::types::Variant;
use thiserror::Error;

/// An underlying property or stream call on the sensor failed.
///
/// Not retryable without re-attaching the sensor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{summary}. Reason: {status}")]
pub struct DeviceConfigError {
    /// SDK property or call that failed
    pub property: String,
    pub value: String,
    pub status: String,
    summary: String,
}

impl DeviceConfigError {
    /// A property write was rejected
    pub fn new(property: impl Into<String>, value: impl ToString, status: impl ToString) -> Self {
        let property = property.into();
        let value = value.to_string();
        Self {
            summary: format!("Failed to set {property} to {value}"),
            property,
            value,
            status: status.to_string(),
        }
    }

    /// A stream operation such as start or stop failed; `action` reads
    /// as the object of "Failed to", e.g. "start image stream".
    pub fn operation(call: impl Into<String>, action: impl ToString, status: impl ToString) -> Self {
        let action = action.to_string();
        Self {
            property: call.into(),
            summary: format!("Failed to {action}"),
            value: action,
            status: status.to_string(),
        }
    }
}

/// The caller asked for a capability the sensor variant does not have
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} does not support {feature}", .variant.display_name())]
pub struct UnsupportedOperationError {
    pub variant: Variant,
    pub feature: String,
}

impl UnsupportedOperationError {
    pub fn new(variant: Variant, feature: impl Into<String>) -> Self {
        Self {
            variant,
            feature: feature.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error(transparent)]
    Config(#[from] DeviceConfigError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperationError),
    #[error("Driver settings error: {0}")]
    Settings(String),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

//! Configuration management for crabdepth
//!
//! Startup settings applied to a device right after attach: output modes,
//! registration, synchronization and the Bayer decoding method.

use crate::decoder::DebayeringMethod;
use crate::errors::DeviceError;
use crate::types::StreamMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub device: DeviceSettings,
    pub decoding: DecodingSettings,
}

/// Stream settings applied after attach
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Remap depth into the image viewpoint
    pub depth_registration: bool,
    /// Hardware frame synchronization (PrimeSense only)
    pub synchronization: bool,
    /// Image output mode; the catalog default when unset
    pub image_mode: Option<StreamMode>,
    /// Depth output mode; the catalog default when unset
    pub depth_mode: Option<StreamMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingSettings {
    /// Demosaicing used for Kinect Bayer frames
    pub debayering: DebayeringMethod,
}

impl DriverConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DeviceError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| DeviceError::Settings(format!("Failed to read config file: {}", e)))?;

        let config: DriverConfig = toml::from_str(&contents)
            .map_err(|e| DeviceError::Settings(format!("Failed to parse config file: {}", e)))?;

        config.validate().map_err(DeviceError::Settings)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DeviceError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DeviceError::Settings(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| DeviceError::Settings(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| DeviceError::Settings(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("crabdepth.toml")
    }

    /// Load from default location, falling back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        for (name, mode) in [
            ("image_mode", self.device.image_mode),
            ("depth_mode", self.device.depth_mode),
        ] {
            if let Some(mode) = mode {
                if mode.width == 0 || mode.height == 0 {
                    return Err(format!("Invalid {} resolution {}", name, mode));
                }
                if mode.frame_rate == 0 {
                    return Err(format!("Invalid {} frame rate {}", name, mode));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert!(!config.device.depth_registration);
        assert!(config.device.image_mode.is_none());
        assert_eq!(config.decoding.debayering, DebayeringMethod::EdgeAwareWeighted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad = DriverConfig::default();
        bad.device.depth_mode = Some(StreamMode::new(0, 480, 30));
        assert!(bad.validate().is_err());

        bad.device.depth_mode = Some(StreamMode::new(640, 480, 0));
        assert!(bad.validate().unwrap_err().contains("frame rate"));
    }

    #[test]
    fn test_partial_toml() {
        let config: DriverConfig = toml::from_str(
            r#"
            [device]
            depth_registration = true

            [device.image_mode]
            width = 1280
            height = 1024
            frame_rate = 15
            "#,
        )
        .unwrap();
        assert!(config.device.depth_registration);
        assert_eq!(config.device.image_mode, Some(StreamMode::sxga(15)));
        assert_eq!(config.decoding, DecodingSettings::default());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = DriverConfig::load_from_file("nonexistent_crabdepth.toml");
        assert_eq!(result.unwrap(), DriverConfig::default());
    }
}

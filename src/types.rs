//! Core value types shared by every layer of the driver

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// VGA resolution used by both sensor families
pub const VGA: (u32, u32) = (640, 480);
/// QVGA resolution (PrimeSense only)
pub const QVGA: (u32, u32) = (320, 240);
/// SXGA resolution (Kinect high-resolution image mode)
pub const SXGA: (u32, u32) = (1280, 1024);

/// A (resolution, frame-rate) pair a stream can be configured to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamMode {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl StreamMode {
    pub const fn new(width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            width,
            height,
            frame_rate,
        }
    }

    const fn at(resolution: (u32, u32), frame_rate: u32) -> Self {
        Self::new(resolution.0, resolution.1, frame_rate)
    }

    pub const fn vga(frame_rate: u32) -> Self {
        Self::at(VGA, frame_rate)
    }

    pub const fn qvga(frame_rate: u32) -> Self {
        Self::at(QVGA, frame_rate)
    }

    pub const fn sxga(frame_rate: u32) -> Self {
        Self::at(SXGA, frame_rate)
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.frame_rate)
    }
}

/// Which of the two data streams an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Image,
    Depth,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Image => write!(f, "image"),
            StreamKind::Depth => write!(f, "depth"),
        }
    }
}

/// Physical sensor family, fixed for the lifetime of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Kinect,
    PrimeSense,
}

impl Variant {
    pub fn all() -> [Variant; 2] {
        [Variant::Kinect, Variant::PrimeSense]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Kinect => "kinect",
            Variant::PrimeSense => "primesense",
        }
    }

    /// Marketing name used in user-facing error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Variant::Kinect => "Microsoft Kinect",
            Variant::PrimeSense => "PrimeSense sensor",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kinect" => Ok(Variant::Kinect),
            "primesense" | "xtion" => Ok(Variant::PrimeSense),
            other => Err(format!("unknown sensor variant: {other}")),
        }
    }
}

/// Run state of a single stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Pixel formats the image generator can be told to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Yuv422,
    /// Bypasses on-device demosaicing, so the raw Bayer mosaic comes through
    Grayscale8,
}

/// Depth crop window in sensor pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cropping {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Cropping {
    /// A request with zero width or height turns cropping off
    pub fn requested(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self {
                x,
                y,
                width,
                height,
            })
        }
    }
}

/// Raw frame as delivered by a generator callback
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub frame_id: u64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(frame_id: u64, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            frame_id,
            width,
            height,
            data,
        }
    }
}

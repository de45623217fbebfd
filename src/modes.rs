//! Fixed per-variant stream mode tables

use crate::types::{StreamKind, StreamMode, Variant};

/// Supported modes for one device, in display order.
///
/// The first entry of each list is the default mode for that stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeCatalog {
    image: Vec<StreamMode>,
    depth: Vec<StreamMode>,
}

impl ModeCatalog {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Kinect => Self {
                image: vec![StreamMode::vga(30), StreamMode::sxga(15)],
                depth: vec![StreamMode::vga(30)],
            },
            // UXGA@30 needs compressed Bayer input and is left out
            Variant::PrimeSense => Self {
                image: vec![
                    StreamMode::vga(30),
                    StreamMode::vga(25),
                    StreamMode::qvga(25),
                    StreamMode::qvga(30),
                    StreamMode::qvga(60),
                ],
                depth: vec![
                    StreamMode::vga(30),
                    StreamMode::vga(25),
                    StreamMode::qvga(25),
                    StreamMode::qvga(30),
                    StreamMode::qvga(60),
                ],
            },
        }
    }

    pub fn available_modes(&self, kind: StreamKind) -> &[StreamMode] {
        match kind {
            StreamKind::Image => &self.image,
            StreamKind::Depth => &self.depth,
        }
    }

    pub fn default_mode(&self, kind: StreamKind) -> StreamMode {
        // Both tables are non-empty for every variant
        self.available_modes(kind)[0]
    }

    pub fn supports(&self, kind: StreamKind, mode: &StreamMode) -> bool {
        self.available_modes(kind).contains(mode)
    }
}

//! Variant to raw-frame decoder mapping
//!
//! The attach-time profile decides what the image generator emits: a raw
//! GRBG Bayer mosaic for Kinect, YUV-422 for PrimeSense. The decoder chosen
//! here tags each frame with that encoding and the output size it will be
//! converted to; the pixel conversion itself happens downstream.

use crate::types::{RawFrame, Variant};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Demosaicing strategy for Bayer frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebayeringMethod {
    Bilinear,
    EdgeAware,
    #[default]
    EdgeAwareWeighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    BayerGrbg(DebayeringMethod),
    Yuv422,
}

impl ImageEncoding {
    /// Bytes per pixel in the raw buffer
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ImageEncoding::BayerGrbg(_) => 1,
            ImageEncoding::Yuv422 => 2,
        }
    }
}

/// A raw frame paired with the decode path that will turn it into RGB
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub encoding: ImageEncoding,
    pub frame: RawFrame,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    /// Whether the buffer is large enough for the declared size and encoding
    pub fn is_complete(&self) -> bool {
        let expected =
            self.frame.width as usize * self.frame.height as usize * self.encoding.bytes_per_pixel();
        self.frame.data.len() >= expected
    }
}

pub trait FrameDecoder: Send + Sync {
    fn encoding(&self) -> ImageEncoding;

    fn decode(&self, frame: RawFrame) -> DecodedImage {
        DecodedImage {
            encoding: self.encoding(),
            frame,
        }
    }

    fn resizing_supported(&self, input_width: u32, input_height: u32, output_width: u32, output_height: u32) -> bool {
        integer_downscale(input_width, input_height, output_width, output_height)
    }
}

/// Output no larger than the input and dividing it exactly in both axes
fn integer_downscale(input_width: u32, input_height: u32, output_width: u32, output_height: u32) -> bool {
    output_width != 0
        && output_height != 0
        && output_width <= input_width
        && output_height <= input_height
        && input_width % output_width == 0
        && input_height % output_height == 0
}

pub struct BayerGrbgDecoder {
    method: DebayeringMethod,
}

impl BayerGrbgDecoder {
    pub fn new(method: DebayeringMethod) -> Self {
        Self { method }
    }
}

impl FrameDecoder for BayerGrbgDecoder {
    fn encoding(&self) -> ImageEncoding {
        ImageEncoding::BayerGrbg(self.method)
    }
}

pub struct Yuv422Decoder;

impl FrameDecoder for Yuv422Decoder {
    fn encoding(&self) -> ImageEncoding {
        ImageEncoding::Yuv422
    }
}

pub fn decoder_for(variant: Variant, debayering: DebayeringMethod) -> Arc<dyn FrameDecoder> {
    match variant {
        Variant::Kinect => Arc::new(BayerGrbgDecoder::new(debayering)),
        Variant::PrimeSense => Arc::new(Yuv422Decoder),
    }
}

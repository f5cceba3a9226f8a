//! Screen-update packet records.
//!
//! A [`VideoPacket`] carries one encoded screen update: which rectangles of
//! the desktop changed, optionally what the frame looks like (sent on the
//! first packet and whenever the geometry or pixel format changes), and the
//! compressed pixel payload.
//!
//! The payload layout is fixed by contract: after decompression it is the
//! byte-wise concatenation, in `dirty_rects` order, of each rectangle's
//! pixels in the advertised pixel format, tightly packed with stride
//! `width * bytes_per_pixel` and no padding between rectangles. A receiver
//! must walk `dirty_rects` in the same order to reassemble the frame.

use serde::{Deserialize, Serialize};

use crate::codec::{from_cbor, to_cbor};
use crate::errors::FrameError;

/// Compression applied to [`VideoPacket::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoEncoding {
    /// Zstandard, one independently decodable stream per packet.
    Zstd,
}

/// An axis-aligned dirty rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels, non-zero.
    pub width: u32,
    /// Height in pixels, non-zero.
    pub height: u32,
}

/// Pixel layout descriptor, mask/shift style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPixelFormat {
    /// Bits per pixel (8, 16, or 32).
    pub bits_per_pixel: u32,
    /// Maximum red value (mask before shifting).
    pub red_max: u32,
    /// Left shift of the red component.
    pub red_shift: u32,
    /// Maximum green value.
    pub green_max: u32,
    /// Left shift of the green component.
    pub green_shift: u32,
    /// Maximum blue value.
    pub blue_max: u32,
    /// Left shift of the blue component.
    pub blue_shift: u32,
}

/// Frame geometry plus pixel format; present when either changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFrameFormat {
    /// Full frame width in pixels.
    pub width: u32,
    /// Full frame height in pixels.
    pub height: u32,
    /// Layout of every pixel in [`VideoPacket::data`].
    pub pixel_format: VideoPixelFormat,
}

/// One encoded screen update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPacket {
    /// Compression of the `data` payload.
    pub encoding: VideoEncoding,
    /// Frame descriptor; `None` when unchanged since the previous packet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<VideoFrameFormat>,
    /// Changed rectangles, in payload concatenation order.
    pub dirty_rects: Vec<VideoRect>,
    /// Compressed pixel payload.
    pub data: Vec<u8>,
}

impl VideoPacket {
    /// Serialize to CBOR.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        to_cbor(self)
    }

    /// Deserialize from CBOR.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        from_cbor(bytes)
    }
}

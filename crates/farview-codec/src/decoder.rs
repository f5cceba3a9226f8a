//! Zstd video decoder.
//!
//! The receiving-side inverse of the encoder: decompress a packet's
//! payload and slice it back into per-rectangle pixel runs, in the
//! packet's rectangle order. Rendering the runs into a framebuffer is the
//! caller's concern.

use farview_proto::{VideoFrameFormat, VideoPacket, VideoRect};

use crate::error::EncodingError;

/// One rectangle's worth of decoded pixels, tightly packed with stride
/// `width * bytes_per_pixel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectUpdate {
    /// Where the pixels go in the frame.
    pub rect: VideoRect,
    /// Pixel bytes in the advertised wire format.
    pub pixels: Vec<u8>,
}

/// Decodes zstd video packets back into rectangle updates.
pub struct VideoDecoderZstd {
    decompressor: zstd::bulk::Decompressor<'static>,
    format: Option<VideoFrameFormat>,
}

impl VideoDecoderZstd {
    /// Fresh decoder; returns `None` if the decompression context cannot
    /// be created.
    pub fn create() -> Option<Self> {
        let decompressor = zstd::bulk::Decompressor::new().ok()?;
        Some(Self { decompressor, format: None })
    }

    /// Frame format from the most recent packet that carried one.
    pub fn format(&self) -> Option<VideoFrameFormat> {
        self.format
    }

    /// Decode one packet into its rectangle updates, in packet order.
    ///
    /// # Errors
    ///
    /// - `EncodingError::MissingFormat` when no packet has advertised a
    ///   frame format yet
    /// - `EncodingError::Decompression` when the payload is not a valid
    ///   zstd frame
    /// - `EncodingError::PayloadMismatch` when the decompressed size does
    ///   not match the rectangle geometry
    pub fn decode(&mut self, packet: &VideoPacket) -> Result<Vec<RectUpdate>, EncodingError> {
        if let Some(format) = packet.format {
            self.format = Some(format);
        }

        let format = self.format.ok_or(EncodingError::MissingFormat)?;
        let bytes_per_pixel = (format.pixel_format.bits_per_pixel / 8) as usize;

        let expected: usize = packet
            .dirty_rects
            .iter()
            .map(|rect| rect.width as usize * rect.height as usize * bytes_per_pixel)
            .sum();

        if expected == 0 {
            return Ok(Vec::new());
        }

        let raw = self
            .decompressor
            .decompress(&packet.data, expected)
            .map_err(|error| EncodingError::Decompression(error.to_string()))?;

        if raw.len() != expected {
            return Err(EncodingError::PayloadMismatch { expected, actual: raw.len() });
        }

        let mut updates = Vec::with_capacity(packet.dirty_rects.len());
        let mut offset = 0;

        for &rect in &packet.dirty_rects {
            let rect_bytes = rect.width as usize * rect.height as usize * bytes_per_pixel;
            updates.push(RectUpdate {
                rect,
                pixels: raw[offset..offset + rect_bytes].to_vec(),
            });
            offset += rect_bytes;
        }

        Ok(updates)
    }
}

//! Zstd video encoder.
//!
//! Turns a captured frame into one [`VideoPacket`]: translate each dirty
//! rectangle into the wire pixel format, concatenate them tightly packed
//! into the retained translate buffer, and compress the whole buffer in a
//! single pass. The compression context is kept across frames for its
//! internal buffers but reinitialised per frame, so every packet is
//! independently decodable by a fresh decoder.

use tracing::{debug, warn};

use farview_proto::{VideoEncoding, VideoFrameFormat, VideoPacket};

use crate::format::PixelFormat;
use crate::frame::CaptureFrame;
use crate::translator::{PixelTranslator, create_translator};

/// Encodes captured frames into zstd-compressed video packets.
pub struct VideoEncoderZstd {
    target_format: PixelFormat,
    translator: Box<dyn PixelTranslator>,
    compressor: zstd::bulk::Compressor<'static>,
    translate_buffer: Vec<u8>,
    /// Geometry and format last advertised to the receiver.
    advertised: Option<(u32, u32)>,
}

impl VideoEncoderZstd {
    /// Build an encoder for the given wire format and compression level.
    ///
    /// The level is clamped to `[1, max]` as reported by the zstd library.
    /// Returns `None` when the pixel format has no translator or the
    /// compression context cannot be created; callers must treat that as
    /// a configuration error, not retry.
    pub fn create(target_format: PixelFormat, compression_level: i32) -> Option<Self> {
        let max_level = *zstd::compression_level_range().end();
        let level = compression_level.clamp(1, max_level);

        let translator = match create_translator(PixelFormat::argb(), target_format) {
            Some(translator) => translator,
            None => {
                warn!(?target_format, "unsupported pixel format");
                return None;
            }
        };

        let compressor = match zstd::bulk::Compressor::new(level) {
            Ok(compressor) => compressor,
            Err(error) => {
                warn!(%error, "failed to create compression context");
                return None;
            }
        };

        debug!(level, ?target_format, "video encoder ready");

        Some(Self {
            target_format,
            translator,
            compressor,
            translate_buffer: Vec::new(),
            advertised: None,
        })
    }

    /// Wire pixel format this encoder emits.
    pub fn target_format(&self) -> PixelFormat {
        self.target_format
    }

    /// Encode one frame.
    ///
    /// The packet carries the frame format descriptor on the first frame
    /// and whenever the geometry changes. A frame with an empty dirty
    /// region produces an empty packet (no rectangles, no payload) without
    /// touching the translate buffer. A compression failure is logged and
    /// produces an empty payload; the next frame retries from scratch.
    pub fn encode(&mut self, frame: &dyn CaptureFrame) -> VideoPacket {
        let mut packet = VideoPacket {
            encoding: VideoEncoding::Zstd,
            format: None,
            dirty_rects: Vec::new(),
            data: Vec::new(),
        };

        let geometry = (frame.width(), frame.height());
        if self.advertised != Some(geometry) {
            packet.format = Some(VideoFrameFormat {
                width: geometry.0,
                height: geometry.1,
                pixel_format: self.target_format.to_video(),
            });
            self.advertised = Some(geometry);
        }

        let region = frame.dirty_region();
        if region.is_empty() {
            return packet;
        }

        let bytes_per_pixel = self.target_format.bytes_per_pixel();

        let mut data_size = 0;
        for rect in region {
            data_size += rect.pixel_count() * bytes_per_pixel;
            packet.dirty_rects.push((*rect).into());
        }

        if self.translate_buffer.len() < data_size {
            self.translate_buffer.resize(data_size, 0);
        }

        let mut offset = 0;
        for rect in region {
            let stride = rect.width as usize * bytes_per_pixel;
            let rect_bytes = rect.height as usize * stride;

            self.translator.translate(
                frame.data_at(rect.x, rect.y),
                frame.stride(),
                &mut self.translate_buffer[offset..offset + rect_bytes],
                stride,
                rect.width,
                rect.height,
            );

            offset += rect_bytes;
        }

        match self.compressor.compress(&self.translate_buffer[..data_size]) {
            Ok(compressed) => packet.data = compressed,
            Err(error) => {
                warn!(%error, "compression failed, emitting empty update");
                packet.data.clear();
            }
        }

        packet
    }
}

#[cfg(test)]
mod tests {
    use farview_proto::VideoRect;

    use super::*;
    use crate::frame::BufferFrame;
    use crate::region::{DirtyRegion, Rect};

    /// A packed ARGB frame whose pixel at (x, y) encodes its coordinates.
    fn coordinate_frame(width: u32, height: u32, region: DirtyRegion) -> BufferFrame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                // B, G, R, A
                data.extend_from_slice(&[x as u8, y as u8, 0x10, 0xFF]);
            }
        }
        BufferFrame::packed_argb(width, height, data, region)
    }

    #[test]
    fn unsupported_format_fails_construction() {
        let odd = PixelFormat { bits_per_pixel: 24, ..PixelFormat::argb() };
        assert!(VideoEncoderZstd::create(odd, 3).is_none());
    }

    #[test]
    fn level_is_clamped_not_rejected() {
        assert!(VideoEncoderZstd::create(PixelFormat::argb(), -100).is_some());
        assert!(VideoEncoderZstd::create(PixelFormat::argb(), 9999).is_some());
    }

    #[test]
    fn empty_region_produces_empty_packet() {
        let mut encoder = VideoEncoderZstd::create(PixelFormat::argb(), 3).unwrap();
        let frame = coordinate_frame(16, 16, DirtyRegion::new());

        let packet = encoder.encode(&frame);

        assert!(packet.dirty_rects.is_empty());
        assert!(packet.data.is_empty());
        assert!(encoder.translate_buffer.is_empty(), "translate buffer must stay untouched");
    }

    #[test]
    fn format_is_advertised_once_until_geometry_changes() {
        let mut encoder = VideoEncoderZstd::create(PixelFormat::argb(), 3).unwrap();

        let region: DirtyRegion = [Rect::new(0, 0, 4, 4)].into_iter().collect();

        let first = encoder.encode(&coordinate_frame(16, 16, region.clone()));
        assert!(first.format.is_some());

        let second = encoder.encode(&coordinate_frame(16, 16, region.clone()));
        assert!(second.format.is_none());

        let resized = encoder.encode(&coordinate_frame(32, 16, region));
        assert_eq!(resized.format.map(|format| format.width), Some(32));
    }

    #[test]
    fn two_rect_payload_layout() {
        let mut encoder = VideoEncoderZstd::create(PixelFormat::argb(), 3).unwrap();

        let region: DirtyRegion =
            [Rect::new(0, 0, 4, 2), Rect::new(6, 5, 2, 1)].into_iter().collect();
        let frame = coordinate_frame(16, 16, region);

        let packet = encoder.encode(&frame);
        assert_eq!(
            packet.dirty_rects,
            vec![
                VideoRect { x: 0, y: 0, width: 4, height: 2 },
                VideoRect { x: 6, y: 5, width: 2, height: 1 },
            ]
        );

        let raw = zstd::bulk::decompress(&packet.data, 1 << 16).unwrap();
        assert_eq!(raw.len(), 4 * 2 * 4 + 2 * 1 * 4);

        // First 32 bytes are the 4x2 rectangle at the origin, row-major.
        for (index, px) in raw[..32].chunks_exact(4).enumerate() {
            let (x, y) = (index % 4, index / 4);
            assert_eq!(px, [x as u8, y as u8, 0x10, 0xFF]);
        }

        // Remaining 8 bytes are the 2x1 rectangle at (6, 5).
        for (index, px) in raw[32..].chunks_exact(4).enumerate() {
            assert_eq!(px, [(6 + index) as u8, 5, 0x10, 0xFF]);
        }
    }

    #[test]
    fn full_screen_encode_round_trips() {
        let mut encoder = VideoEncoderZstd::create(PixelFormat::argb(), 3).unwrap();

        let region: DirtyRegion = [Rect::new(0, 0, 10, 10)].into_iter().collect();
        let frame = coordinate_frame(10, 10, region);

        let packet = encoder.encode(&frame);

        assert_eq!(packet.encoding, VideoEncoding::Zstd);
        assert_eq!(packet.dirty_rects.len(), 1);

        let raw = zstd::bulk::decompress(&packet.data, 1 << 16).unwrap();
        assert_eq!(raw.len(), 400);
        assert_eq!(raw, frame.data(), "identity translation must reproduce the source pixels");
    }

    #[test]
    fn each_packet_is_independently_decodable() {
        let mut encoder = VideoEncoderZstd::create(PixelFormat::argb(), 3).unwrap();
        let region: DirtyRegion = [Rect::new(0, 0, 8, 8)].into_iter().collect();

        // A fresh decompression context per packet must succeed for both.
        for _ in 0..2 {
            let packet = encoder.encode(&coordinate_frame(8, 8, region.clone()));
            let raw = zstd::bulk::decompress(&packet.data, 1 << 16).unwrap();
            assert_eq!(raw.len(), 8 * 8 * 4);
        }
    }
}

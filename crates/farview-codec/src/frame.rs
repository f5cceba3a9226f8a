//! Captured desktop frames.
//!
//! Capture itself is platform work that lives outside this crate; the
//! encoder only needs the seam defined here. A capturer hands over pixel
//! data in the 32-bpp source format together with the region that changed
//! since the previous frame.

use crate::format::PixelFormat;
use crate::region::DirtyRegion;

/// One captured frame, as the encoder consumes it.
pub trait CaptureFrame {
    /// Frame width in pixels.
    fn width(&self) -> u32;

    /// Frame height in pixels.
    fn height(&self) -> u32;

    /// Bytes per pixel row, including any capture padding.
    fn stride(&self) -> usize;

    /// Pixel data, `height * stride` bytes in the source format.
    fn data(&self) -> &[u8];

    /// Layout of the pixel data.
    fn format(&self) -> PixelFormat;

    /// Rectangles that changed since the previous frame.
    fn dirty_region(&self) -> &DirtyRegion;

    /// Pixel data starting at `(x, y)`.
    fn data_at(&self, x: u32, y: u32) -> &[u8] {
        let offset =
            y as usize * self.stride() + x as usize * self.format().bytes_per_pixel();
        &self.data()[offset..]
    }
}

/// Frame backed by an owned buffer. The capture integration produces
/// these; tests build them directly.
#[derive(Debug, Clone)]
pub struct BufferFrame {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
    format: PixelFormat,
    dirty_region: DirtyRegion,
}

impl BufferFrame {
    /// Wrap a pixel buffer. `data` must hold `height * stride` bytes.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
        format: PixelFormat,
        dirty_region: DirtyRegion,
    ) -> Self {
        debug_assert!(data.len() >= height as usize * stride);
        Self { width, height, stride, data, format, dirty_region }
    }

    /// A tightly-packed frame in the source capture format.
    pub fn packed_argb(width: u32, height: u32, data: Vec<u8>, dirty_region: DirtyRegion) -> Self {
        let format = PixelFormat::argb();
        let stride = width as usize * format.bytes_per_pixel();
        Self::new(width, height, stride, data, format, dirty_region)
    }

    /// Replace the dirty region (e.g. after capture diffing).
    pub fn set_dirty_region(&mut self, region: DirtyRegion) {
        self.dirty_region = region;
    }
}

impl CaptureFrame for BufferFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn stride(&self) -> usize {
        self.stride
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn dirty_region(&self) -> &DirtyRegion {
        &self.dirty_region
    }
}

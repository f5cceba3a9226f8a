//! Screen-update pipeline for the Farview remote-desktop protocol.
//!
//! Host side: an external capturer produces frames in 32-bpp ARGB with a
//! dirty region; [`VideoEncoderZstd`] translates each dirty rectangle to
//! the negotiated wire pixel format, packs the rectangles tightly in
//! iteration order, and compresses the result into one [`VideoPacket`]
//! per frame. [`VideoDecoderZstd`] is the receiving-side inverse, up to
//! but not including rendering.
//!
//! The pipeline is the host's hot path: the translator runs per dirty
//! pixel per frame and the compression context is retained across frames
//! to avoid reallocation.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod frame;
pub mod region;
pub mod translator;

pub use decoder::{RectUpdate, VideoDecoderZstd};
pub use encoder::VideoEncoderZstd;
pub use error::EncodingError;
pub use format::PixelFormat;
pub use frame::{BufferFrame, CaptureFrame};
pub use region::{DirtyRegion, Rect};
pub use translator::{PixelTranslator, create_translator};

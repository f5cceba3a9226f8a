//! Error types for the screen-update pipeline.

use thiserror::Error;

/// Errors raised while decoding a video packet.
///
/// Encoding failures never surface as errors: the encoder logs and emits
/// an empty payload for the offending frame, and the next frame starts
/// from scratch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A packet arrived before any frame format was advertised.
    #[error("no frame format advertised")]
    MissingFormat,

    /// The compressed payload could not be decompressed.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// The decompressed payload does not match the dirty-rect geometry.
    #[error("payload size mismatch: expected {expected} bytes, got {actual}")]
    PayloadMismatch {
        /// Bytes implied by the dirty rectangles and pixel format.
        expected: usize,
        /// Bytes actually present after decompression.
        actual: usize,
    },
}

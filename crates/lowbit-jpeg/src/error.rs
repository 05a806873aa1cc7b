//! Error types for JPEG coefficient transcoding.

use std::fmt;
use thiserror::Error;

/// Result type alias for JPEG operations.
pub type Result<T> = std::result::Result<T, JpegError>;

/// Errors that can occur while parsing, decoding or re-encoding a JPEG stream.
#[derive(Error)]
pub enum JpegError {
    /// The stream does not start with an SOI marker.
    #[error("not a JPEG stream (missing SOI marker)")]
    NotJpeg,

    /// The stream is structurally broken.
    #[error("malformed JPEG: {reason}")]
    Malformed { reason: String },

    /// The stream is valid but uses a coding mode this crate does not handle.
    #[error("unsupported JPEG: {reason}")]
    Unsupported { reason: String },

    /// A symbol needed for re-encoding is absent from the Huffman table in use.
    #[error("symbol 0x{symbol:02X} is missing from {class} Huffman table {id}")]
    MissingHuffmanSymbol {
        class: &'static str,
        id: u8,
        symbol: u8,
    },

    /// A comment segment would exceed the 16-bit segment length.
    #[error("tag of {len} bytes does not fit into a comment segment")]
    TagTooLarge { len: usize },

    /// A crop window falls outside of the MCU grid.
    #[error("crop window rows {rows:?} cols {cols:?} exceeds the {mcu_rows}x{mcu_cols} MCU grid")]
    CropOutOfBounds {
        rows: std::ops::Range<usize>,
        cols: std::ops::Range<usize>,
        mcu_rows: usize,
        mcu_cols: usize,
    },

    /// Reading the underlying bytes failed.
    #[error("JPEG I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JpegError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        JpegError::Malformed {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        JpegError::Unsupported {
            reason: reason.into(),
        }
    }
}

impl fmt::Debug for JpegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug prints like Display so that unwrap() in tests stays readable
        write!(f, "{self}")
    }
}

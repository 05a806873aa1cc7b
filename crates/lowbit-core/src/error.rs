use lowbit_jpeg::JpegError;
use thiserror::Error;

use crate::carrier::CarrierKind;

#[derive(Error, Debug)]
pub enum LowbitError {
    /// The payload does not fit into the eligible positions of the carrier.
    #[error("Capacity error: {required} bytes requested but the carrier only holds {available}")]
    CapacityExceeded { required: usize, available: usize },

    /// The metadata record is absent, corrupt or out of range, usually a sign of tampering.
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(#[from] MetadataError),

    /// Represents an embedding parameter outside of the domain of its carrier kind
    #[error("Parameter {parameter} is out of range for {kind:?} carriers, expected {min}..={max}")]
    InvalidParameter {
        kind: CarrierKind,
        parameter: u8,
        min: u8,
        max: u8,
    },

    #[error("Refusing to embed an empty payload")]
    EmptyPayload,

    /// Represents an unsupported carrier media. For example, a GIF file is not supported
    #[error("Media format is not supported")]
    UnsupportedMedia,

    /// Represents an invalid carrier image media. For example, a broken PNG file
    #[error("Image media is invalid")]
    InvalidImageMedia,

    /// Represents a failure when encoding an image file.
    #[error("Image encoding error")]
    ImageEncodingError,

    /// Represents a failure inside of the JPEG coefficient transcoder
    #[error(transparent)]
    Jpeg(#[from] JpegError),

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Crop window is outside of the carrier")]
    InvalidCrop,

    #[error("Visual attack needs 1..=8 low bits and a boost of 0..=7, got {bits} and {boost}")]
    InvalidVisualAttack { bits: u8, boost: u8 },

    #[error("No carrier media set")]
    CarrierNotSet,

    #[error("No target file set")]
    TargetNotSet,

    #[error("API Error: Missing payload")]
    MissingPayload,
}

/// Why a metadata record was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("no record stored under `{key}`")]
    Missing { key: &'static str },

    #[error("expected {expected} fields but found {found} in `{record}`")]
    FieldCount {
        expected: usize,
        found: usize,
        record: String,
    },

    #[error("field `{field}` is not an integer: `{value}`")]
    NotAnInteger { field: &'static str, value: String },

    #[error("field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },
}

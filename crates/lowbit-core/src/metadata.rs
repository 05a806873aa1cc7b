//! The side channel record that tells the extractor what was embedded.
//!
//! It is stored as `"<payload_bit_length>-<parameter>"` under
//! [`METADATA_KEY`] in the tag store of the image.

use std::fmt::{self, Display, Formatter};

use crate::carrier::CarrierKind;
use crate::error::MetadataError;
use crate::tags::TagStore;

/// Tag under which the record is stored, rarely touched by other software.
pub const METADATA_KEY: &str = "UserComment";

const FIELD_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub payload_bits: u64,
    pub parameter: u8,
}

impl Metadata {
    pub fn new(payload_bits: u64, parameter: u8) -> Self {
        Metadata {
            payload_bits,
            parameter,
        }
    }

    /// Parses a record and validates both fields against the carrier kind.
    pub fn parse(record: &str, kind: CarrierKind) -> Result<Self, MetadataError> {
        let fields: Vec<&str> = record.split('-').collect();
        if fields.len() != FIELD_COUNT {
            return Err(MetadataError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
                record: record.to_string(),
            });
        }

        let payload_bits = integer("payload_bit_length", fields[0])?;
        if payload_bits < 1 {
            return Err(MetadataError::OutOfRange {
                field: "payload_bit_length",
                value: payload_bits,
            });
        }

        let parameter = integer("parameter", fields[1])?;
        let parameter = u8::try_from(parameter)
            .ok()
            .filter(|p| kind.parameter_range().contains(p))
            .ok_or(MetadataError::OutOfRange {
                field: "parameter",
                value: parameter,
            })?;

        Ok(Metadata::new(payload_bits, parameter))
    }

    pub fn read(tags: &impl TagStore, kind: CarrierKind) -> Result<Self, MetadataError> {
        let record = tags.tag(METADATA_KEY).ok_or(MetadataError::Missing {
            key: METADATA_KEY,
        })?;
        Self::parse(record, kind)
    }

    pub fn write(&self, tags: &mut impl TagStore) {
        tags.set_tag(METADATA_KEY, self.to_string());
    }
}

/// Decimal digits in canonical form, no sign and no leading zeros.
fn integer(field: &'static str, value: &str) -> Result<u64, MetadataError> {
    let canonical = value.bytes().all(|b| b.is_ascii_digit())
        && (value == "0" || !value.starts_with('0'));
    canonical
        .then(|| value.parse().ok())
        .flatten()
        .ok_or_else(|| MetadataError::NotAnInteger {
            field,
            value: value.to_string(),
        })
}

impl Display for Metadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.payload_bits, self.parameter)
    }
}

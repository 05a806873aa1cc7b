//! Key/value tags kept in COM segments.
//!
//! A tag segment holds `lowbit\0<key>\0<value>`. Comments without that
//! signature belong to someone else and are never touched.

use crate::error::{JpegError, Result};
use crate::marker::Marker;
use crate::parser::Segment;

const SIGNATURE: &[u8] = b"lowbit\0";
const MAX_SEGMENT_DATA: usize = u16::MAX as usize - 2;

fn decode_tag(segment: &Segment) -> Option<(String, String)> {
    if segment.marker != Marker::COM {
        return None;
    }
    let body = segment.data.strip_prefix(SIGNATURE)?;
    let split = body.iter().position(|&b| b == 0)?;
    Some((
        String::from_utf8_lossy(&body[..split]).into_owned(),
        String::from_utf8_lossy(&body[split + 1..]).into_owned(),
    ))
}

fn encode_tag(key: &str, value: &str) -> Result<Segment> {
    let mut data = Vec::with_capacity(SIGNATURE.len() + key.len() + 1 + value.len());
    data.extend_from_slice(SIGNATURE);
    data.extend_from_slice(key.as_bytes());
    data.push(0);
    data.extend_from_slice(value.as_bytes());
    if data.len() > MAX_SEGMENT_DATA {
        return Err(JpegError::TagTooLarge { len: data.len() });
    }
    Ok(Segment {
        marker: Marker::COM,
        data,
    })
}

/// All tags in file order.
pub fn read_tags(segments: &[Segment]) -> Vec<(String, String)> {
    segments.iter().filter_map(decode_tag).collect()
}

/// Replaces the tag `key` in place, or inserts it after the leading APPn segments.
pub fn write_tag(segments: &mut Vec<Segment>, key: &str, value: &str) -> Result<()> {
    let segment = encode_tag(key, value)?;
    let existing = segments
        .iter()
        .position(|s| decode_tag(s).is_some_and(|(k, _)| k == key));

    match existing {
        Some(index) => segments[index] = segment,
        None => {
            let index = segments
                .iter()
                .position(|s| !matches!(s.marker, Marker::APP(_)))
                .unwrap_or(segments.len());
            segments.insert(index, segment);
        }
    }
    Ok(())
}

/// Removes the tag `key`, returning whether it was present.
pub fn remove_tag(segments: &mut Vec<Segment>, key: &str) -> bool {
    let before = segments.len();
    segments.retain(|s| !decode_tag(s).is_some_and(|(k, _)| k == key));
    before != segments.len()
}

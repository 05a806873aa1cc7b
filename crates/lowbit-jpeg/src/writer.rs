//! Reassembles a JPEG file from header segments and a re-encoded scan.

use crate::marker::Marker;
use crate::parser::{FrameInfo, Segment};

/// Writes SOI, every header segment, a baseline SOS header, the scan and EOI.
pub fn write_jpeg(segments: &[Segment], frame: &FrameInfo, scan: &[u8]) -> Vec<u8> {
    let header_len: usize = segments.iter().map(|s| s.data.len() + 4).sum();
    let mut out = Vec::with_capacity(header_len + scan.len() + 32);

    out.extend_from_slice(&[0xFF, Marker::SOI.to_u8()]);
    for segment in segments.iter().filter(|s| s.marker != Marker::SOS) {
        out.extend_from_slice(&[0xFF, segment.marker.to_u8()]);
        if segment.marker.has_length() {
            out.extend_from_slice(&((segment.data.len() + 2) as u16).to_be_bytes());
        }
        out.extend_from_slice(&segment.data);
    }

    write_sos_header(&mut out, frame);
    out.extend_from_slice(scan);
    out.extend_from_slice(&[0xFF, Marker::EOI.to_u8()]);
    out
}

fn write_sos_header(out: &mut Vec<u8>, frame: &FrameInfo) {
    let count = frame.components.len();
    out.extend_from_slice(&[0xFF, Marker::SOS.to_u8()]);
    out.extend_from_slice(&((6 + 2 * count) as u16).to_be_bytes());
    out.push(count as u8);
    for component in &frame.components {
        out.push(component.id);
        out.push((component.dc_table_id << 4) | component.ac_table_id);
    }
    // Ss, Se, Ah/Al of a sequential scan
    out.extend_from_slice(&[0, 63, 0]);
}

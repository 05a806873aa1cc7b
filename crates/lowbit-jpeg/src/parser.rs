//! Splits a JPEG stream into its header segments and entropy-coded scan.
//!
//! Only what is needed for coefficient-level transcoding is interpreted:
//! Huffman tables (DHT), the frame header (SOF), the restart interval (DRI)
//! and the scan header (SOS). Every other segment is carried along verbatim.

use std::io::{Cursor, Read};

use crate::error::{JpegError, Result};
use crate::marker::Marker;

/// Zigzag scan index to natural (row-major) index.
pub const ZIGZAG_TO_NATURAL: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27, 20,
    13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58, 59,
    52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Huffman table class as stored in the high nibble of a DHT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClass {
    Dc,
    Ac,
}

impl TableClass {
    pub(crate) fn name(self) -> &'static str {
        match self {
            TableClass::Dc => "DC",
            TableClass::Ac => "AC",
        }
    }
}

/// A Huffman table in its DHT form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTable {
    pub class: TableClass,
    /// Destination id 0-3.
    pub id: u8,
    /// Number of codes of each length 1..=16.
    pub code_lengths: [u8; 16],
    /// Symbols in order of increasing code length.
    pub values: Vec<u8>,
}

impl HuffmanTable {
    /// Serializes the table as one DHT entry.
    pub(crate) fn to_dht_bytes(&self) -> Vec<u8> {
        let class = match self.class {
            TableClass::Dc => 0,
            TableClass::Ac => 1,
        };
        let mut out = Vec::with_capacity(17 + self.values.len());
        out.push((class << 4) | self.id);
        out.extend_from_slice(&self.code_lengths);
        out.extend_from_slice(&self.values);
        out
    }
}

/// One frame component with the table assignment of the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: u8,
    pub h_sampling: u8,
    pub v_sampling: u8,
    pub quant_table_id: u8,
    pub dc_table_id: u8,
    pub ac_table_id: u8,
}

/// Frame header (SOF).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// SOF process number, 0 for baseline.
    pub sof_type: u8,
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: Vec<Component>,
}

impl FrameInfo {
    /// Huffman coded sequential DCT: baseline (SOF0) or extended (SOF1).
    pub fn is_sequential_huffman(&self) -> bool {
        matches!(self.sof_type, 0 | 1)
    }

    pub fn is_progressive(&self) -> bool {
        matches!(self.sof_type, 2 | 6 | 10 | 14)
    }
}

/// A header segment without its marker and length bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub marker: Marker,
    pub data: Vec<u8>,
}

/// Parsed JPEG stream.
#[derive(Debug, Clone, Default)]
pub struct JpegSegments {
    /// Every segment before SOS, in file order.
    pub segments: Vec<Segment>,
    pub dc_tables: [Option<HuffmanTable>; 4],
    pub ac_tables: [Option<HuffmanTable>; 4],
    pub frame: Option<FrameInfo>,
    /// MCUs per restart interval, 0 when restarts are disabled.
    pub restart_interval: u16,
    /// Entropy-coded data including byte stuffing and RST markers.
    pub scan_data: Vec<u8>,
}

impl JpegSegments {
    pub fn frame(&self) -> Result<&FrameInfo> {
        self.frame
            .as_ref()
            .ok_or_else(|| JpegError::malformed("missing frame header (SOF)"))
    }
}

/// Parses a complete JPEG file.
pub fn parse_jpeg(data: &[u8]) -> Result<JpegSegments> {
    let mut reader = Cursor::new(data);
    let mut segments = JpegSegments::default();

    let mut soi = [0u8; 2];
    reader.read_exact(&mut soi)?;
    if soi != [0xFF, 0xD8] {
        return Err(JpegError::NotJpeg);
    }

    loop {
        let marker = read_marker(&mut reader)?;
        match marker {
            Marker::EOI => {
                return Err(JpegError::malformed("image ends before the first scan"));
            }
            Marker::SOS => {
                let header = read_segment(&mut reader)?;
                parse_sos_header(&header, &mut segments)?;

                let start = reader.position() as usize;
                let (scan, terminator) = read_scan_data(&data[start..]);
                match terminator {
                    Some(Marker::EOI) | None => {}
                    Some(other) => {
                        return Err(JpegError::unsupported(format!(
                            "multiple scans (scan followed by marker {other:?})"
                        )))
                    }
                }
                segments.scan_data = scan;
                return Ok(segments);
            }
            Marker::DHT => {
                let data = read_segment(&mut reader)?;
                parse_dht(&data, &mut segments)?;
                segments.segments.push(Segment { marker, data });
            }
            Marker::SOF(n) => {
                let data = read_segment(&mut reader)?;
                segments.frame = Some(parse_sof(n, &data)?);
                segments.segments.push(Segment { marker, data });
            }
            Marker::DRI => {
                let data = read_segment(&mut reader)?;
                if data.len() < 2 {
                    return Err(JpegError::malformed("DRI segment too short"));
                }
                segments.restart_interval = u16::from_be_bytes([data[0], data[1]]);
                segments.segments.push(Segment { marker, data });
            }
            _ if marker.has_length() => {
                let data = read_segment(&mut reader)?;
                segments.segments.push(Segment { marker, data });
            }
            _ => log::debug!("skipping stray marker {marker:?} before scan"),
        }
    }
}

fn read_marker<R: Read>(reader: &mut R) -> Result<Marker> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    if byte[0] != 0xFF {
        return Err(JpegError::malformed(format!(
            "expected marker, found byte 0x{:02X}",
            byte[0]
        )));
    }
    // fill bytes may precede the marker code
    while byte[0] == 0xFF {
        reader.read_exact(&mut byte)?;
    }
    Marker::from_u8(byte[0])
        .ok_or_else(|| JpegError::malformed(format!("invalid marker 0xFF{:02X}", byte[0])))
}

/// Reads a length-prefixed segment body.
fn read_segment<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut len = [0u8; 2];
    reader.read_exact(&mut len)?;
    let len = u16::from_be_bytes(len) as usize;
    if len < 2 {
        return Err(JpegError::malformed("segment length too small"));
    }
    let mut data = vec![0u8; len - 2];
    reader.read_exact(&mut data)?;
    Ok(data)
}

/// Collects entropy-coded bytes up to the next non-RST marker.
///
/// Stuffed bytes and restart markers stay in place; the marker that ends the
/// scan is returned alongside, `None` when the data simply runs out.
fn read_scan_data(data: &[u8]) -> (Vec<u8>, Option<Marker>) {
    let mut pos = 0;
    while pos < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let mut next = pos + 1;
        while next < data.len() && data[next] == 0xFF {
            next += 1;
        }
        match data.get(next) {
            None => return (data[..pos].to_vec(), None),
            Some(0x00) | Some(0xD0..=0xD7) => pos = next + 1,
            Some(&code) => return (data[..pos].to_vec(), Marker::from_u8(code)),
        }
    }
    (data.to_vec(), None)
}

fn parse_dht(data: &[u8], segments: &mut JpegSegments) -> Result<()> {
    let mut pos = 0;
    while pos < data.len() {
        let class = match data[pos] >> 4 {
            0 => TableClass::Dc,
            1 => TableClass::Ac,
            other => {
                return Err(JpegError::malformed(format!(
                    "invalid Huffman table class {other}"
                )))
            }
        };
        let id = data[pos] & 0x0F;
        if id > 3 {
            return Err(JpegError::malformed(format!("invalid Huffman table id {id}")));
        }
        pos += 1;

        let lengths = data
            .get(pos..pos + 16)
            .ok_or_else(|| JpegError::malformed("DHT segment too short for code lengths"))?;
        let mut code_lengths = [0u8; 16];
        code_lengths.copy_from_slice(lengths);
        pos += 16;

        let count: usize = code_lengths.iter().map(|&n| n as usize).sum();
        let values = data
            .get(pos..pos + count)
            .ok_or_else(|| JpegError::malformed("DHT segment too short for symbols"))?
            .to_vec();
        pos += count;

        let table = HuffmanTable {
            class,
            id,
            code_lengths,
            values,
        };
        match class {
            TableClass::Dc => segments.dc_tables[id as usize] = Some(table),
            TableClass::Ac => segments.ac_tables[id as usize] = Some(table),
        }
    }
    Ok(())
}

fn parse_sof(sof_type: u8, data: &[u8]) -> Result<FrameInfo> {
    if data.len() < 6 {
        return Err(JpegError::malformed("SOF segment too short"));
    }
    let count = data[5] as usize;
    if data.len() < 6 + count * 3 {
        return Err(JpegError::malformed("SOF segment too short for its components"));
    }

    let components = data[6..6 + count * 3]
        .chunks_exact(3)
        .map(|c| Component {
            id: c[0],
            h_sampling: c[1] >> 4,
            v_sampling: c[1] & 0x0F,
            quant_table_id: c[2],
            dc_table_id: 0,
            ac_table_id: 0,
        })
        .collect();

    Ok(FrameInfo {
        sof_type,
        precision: data[0],
        height: u16::from_be_bytes([data[1], data[2]]),
        width: u16::from_be_bytes([data[3], data[4]]),
        components,
    })
}

/// Assigns the scan's table ids to the frame components.
///
/// The scan has to cover every frame component in frame order with the full
/// spectral range; anything else is a multi-scan or progressive layout.
fn parse_sos_header(data: &[u8], segments: &mut JpegSegments) -> Result<()> {
    let count = *data
        .first()
        .ok_or_else(|| JpegError::malformed("empty SOS header"))? as usize;
    if data.len() < 1 + count * 2 + 3 {
        return Err(JpegError::malformed("SOS header too short"));
    }

    let frame = segments
        .frame
        .as_mut()
        .ok_or_else(|| JpegError::malformed("scan appears before the frame header"))?;
    if count != frame.components.len() {
        return Err(JpegError::unsupported(format!(
            "scan covers {count} of {} components",
            frame.components.len()
        )));
    }

    for (component, spec) in frame
        .components
        .iter_mut()
        .zip(data[1..1 + count * 2].chunks_exact(2))
    {
        if component.id != spec[0] {
            return Err(JpegError::unsupported(
                "scan component order differs from frame order",
            ));
        }
        component.dc_table_id = spec[1] >> 4;
        component.ac_table_id = spec[1] & 0x0F;
        if component.dc_table_id > 3 || component.ac_table_id > 3 {
            return Err(JpegError::malformed("Huffman table id out of range in SOS"));
        }
    }

    let spectral = &data[1 + count * 2..];
    if frame.is_sequential_huffman() && (spectral[0] != 0 || spectral[1] != 63 || spectral[2] != 0)
    {
        return Err(JpegError::unsupported("sequential scan without full spectral range"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_header(sos_components: &[(u8, u8)]) -> Vec<u8> {
        let mut out = vec![0xFF, 0xD8];
        // SOF0: 8 bit, 16x8, two components
        out.extend_from_slice(&[0xFF, 0xC0, 0x00, 14, 8, 0, 8, 0, 16, 2, 1, 0x11, 0, 2, 0x11, 1]);
        out.extend_from_slice(&[0xFF, 0xDD, 0x00, 0x04, 0x00, 0x02]);
        let len = 2 + 1 + sos_components.len() * 2 + 3;
        out.extend_from_slice(&[0xFF, 0xDA, 0, len as u8, sos_components.len() as u8]);
        for &(id, tables) in sos_components {
            out.extend_from_slice(&[id, tables]);
        }
        out.extend_from_slice(&[0, 63, 0]);
        out
    }

    #[test]
    fn rejects_streams_without_soi() {
        assert!(matches!(parse_jpeg(&[0x89, 0x50, 0x4E, 0x47]), Err(JpegError::NotJpeg)));
    }

    #[test]
    fn keeps_stuffing_and_restart_markers_in_scan_data() {
        let mut jpeg = minimal_header(&[(1, 0x00), (2, 0x11)]);
        jpeg.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD0, 0x56, 0xFF, 0xD9]);

        let segments = parse_jpeg(&jpeg).expect("valid stream");
        assert_eq!(segments.scan_data, vec![0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD0, 0x56]);
        assert_eq!(segments.restart_interval, 2);

        let frame = segments.frame().expect("frame");
        assert_eq!((frame.width, frame.height), (16, 8));
        assert_eq!(frame.components[1].dc_table_id, 1);
        assert_eq!(frame.components[1].ac_table_id, 1);
    }

    #[test]
    fn rejects_scans_that_skip_components() {
        let mut jpeg = minimal_header(&[(1, 0x00)]);
        jpeg.extend_from_slice(&[0x00, 0xFF, 0xD9]);
        assert!(matches!(parse_jpeg(&jpeg), Err(JpegError::Unsupported { .. })));
    }

    #[test]
    fn rejects_a_second_scan() {
        let mut jpeg = minimal_header(&[(1, 0x00), (2, 0x11)]);
        jpeg.extend_from_slice(&[0x00, 0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9]);
        let error = parse_jpeg(&jpeg).expect_err("second scan");
        assert!(error.to_string().contains("multiple scans"));
    }

    #[test]
    fn parses_multiple_tables_from_one_dht_segment() {
        let mut dht = vec![0x00];
        dht.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        dht.push(0x05);
        dht.push(0x13);
        dht.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        dht.push(0x00);

        let mut segments = JpegSegments::default();
        parse_dht(&dht, &mut segments).expect("valid DHT");

        let dc = segments.dc_tables[0].as_ref().expect("DC table 0");
        assert_eq!(dc.values, vec![0x05]);
        let ac = segments.ac_tables[3].as_ref().expect("AC table 3");
        assert_eq!(ac.class, TableClass::Ac);
        assert_eq!(ac.to_dht_bytes()[0], 0x13);
    }
}

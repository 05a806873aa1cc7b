//! Read-only lookup of the EXIF `UserComment` tag.
//!
//! Tools that keep their records in EXIF instead of COM segments put them in
//! `UserComment` (tag 0x9286 of the Exif sub-IFD) inside the APP1 segment.
//! Only that one tag is looked up, nothing is ever written back.

use crate::marker::Marker;
use crate::parser::Segment;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const EXIF_IFD_POINTER: u16 = 0x8769;
const USER_COMMENT: u16 = 0x9286;
const IFD_ENTRY_LEN: usize = 12;

#[derive(Clone, Copy)]
enum ByteOrder {
    Intel,
    Motorola,
}

struct Tiff<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> Tiff<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        let order = match data.get(..4)? {
            [b'I', b'I', 0x2A, 0x00] => ByteOrder::Intel,
            [b'M', b'M', 0x00, 0x2A] => ByteOrder::Motorola,
            _ => return None,
        };
        Some(Tiff { data, order })
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Intel => u16::from_le_bytes(bytes),
            ByteOrder::Motorola => u16::from_be_bytes(bytes),
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Intel => u32::from_le_bytes(bytes),
            ByteOrder::Motorola => u32::from_be_bytes(bytes),
        })
    }

    /// Offset of the entry for `tag` in the IFD at `ifd`.
    fn find_entry(&self, ifd: usize, tag: u16) -> Option<usize> {
        let count = usize::from(self.u16_at(ifd)?);
        (0..count)
            .map(|i| ifd + 2 + i * IFD_ENTRY_LEN)
            .find(|&entry| self.u16_at(entry) == Some(tag))
    }

    /// Raw bytes of an entry, inline when they fit in four bytes.
    fn entry_bytes(&self, entry: usize) -> Option<&'a [u8]> {
        let len = usize::try_from(self.u32_at(entry + 4)?).ok()?;
        let start = if len <= 4 {
            entry + 8
        } else {
            usize::try_from(self.u32_at(entry + 8)?).ok()?
        };
        self.data.get(start..start.checked_add(len)?)
    }

    fn user_comment(&self) -> Option<&'a [u8]> {
        let ifd0 = usize::try_from(self.u32_at(4)?).ok()?;
        let pointer = self.find_entry(ifd0, EXIF_IFD_POINTER)?;
        let exif_ifd = usize::try_from(self.u32_at(pointer + 8)?).ok()?;
        let entry = self.find_entry(exif_ifd, USER_COMMENT)?;
        self.entry_bytes(entry)
    }
}

/// Strips the optional 8-byte character code and trailing padding.
fn comment_text(raw: &[u8]) -> Option<String> {
    let text = match raw.get(..8) {
        Some(b"ASCII\0\0\0") | Some([0, 0, 0, 0, 0, 0, 0, 0]) => &raw[8..],
        Some(b"UNICODE\0") | Some(b"JIS\0\0\0\0\0") => return None,
        _ => raw,
    };
    let text = std::str::from_utf8(text).ok()?;
    let text = text.trim_end_matches(['\0', ' ']);
    (!text.is_empty()).then(|| text.to_string())
}

/// The `UserComment` of the first EXIF APP1 segment, if it holds text.
pub fn read_user_comment(segments: &[Segment]) -> Option<String> {
    segments
        .iter()
        .filter(|s| s.marker == Marker::APP(1))
        .find_map(|s| s.data.strip_prefix(EXIF_HEADER))
        .and_then(Tiff::new)
        .and_then(|tiff| tiff.user_comment())
        .and_then(comment_text)
}

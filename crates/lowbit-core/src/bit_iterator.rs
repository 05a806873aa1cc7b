use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

/// Iterates the bits of a byte slice, most significant bit of each byte first.
pub struct BitIterator<'a> {
    reader: BitReader<&'a [u8], BigEndian>,
    remaining: u64,
}

impl<'a> BitIterator<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BitIterator {
            reader: BitReader::endian(bytes, BigEndian),
            remaining: bytes.len() as u64 * 8,
        }
    }

    /// Takes the next `width` bits as one value, zero padding on the right
    /// when fewer are left. Returns `None` once every bit was handed out.
    pub fn next_chunk(&mut self, width: u8) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        let mut value = 0;
        for _ in 0..width {
            value = (value << 1) | self.next().unwrap_or(0);
        }
        Some(value)
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Iterator for BitIterator<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.reader.read_bit().ok().map(u8::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitIterator<'_> {}

/// Collects bits back into bytes, most significant bit first.
///
/// Bits that do not complete a byte are dropped by [`BitCollector::into_bytes`].
pub struct BitCollector {
    writer: BitWriter<Vec<u8>, BigEndian>,
    bits: u64,
}

impl BitCollector {
    pub fn with_capacity(bytes: usize) -> Self {
        BitCollector {
            writer: BitWriter::endian(Vec::with_capacity(bytes), BigEndian),
            bits: 0,
        }
    }

    pub fn push_bit(&mut self, bit: u8) -> io::Result<()> {
        self.writer.write_bit(bit & 1 == 1)?;
        self.bits += 1;
        Ok(())
    }

    /// Pushes the leading `take` bits of a `width` bit chunk.
    pub fn push_chunk(&mut self, chunk: u8, width: u8, take: u8) -> io::Result<()> {
        for shift in (width - take..width).rev() {
            self.push_bit(chunk >> shift)?;
        }
        Ok(())
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_writer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_the_bits_of_h_msb_first() {
        let bits: Vec<u8> = BitIterator::new(b"H").collect();
        assert_eq!(bits, vec![0, 1, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn should_end_after_the_last_bit_of_the_last_byte() {
        let mut it = BitIterator::new(&[0xFF, 0x00]);
        assert_eq!(it.len(), 16);
        assert_eq!(it.by_ref().count(), 16);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn should_pad_the_last_chunk_with_zeros() {
        // 0b1011_0110 in chunks of 3: 101, 101, 10 + pad
        let mut it = BitIterator::new(&[0b1011_0110]);
        assert_eq!(it.next_chunk(3), Some(0b101));
        assert_eq!(it.next_chunk(3), Some(0b101));
        assert_eq!(it.next_chunk(3), Some(0b100));
        assert_eq!(it.next_chunk(3), None);
    }

    #[test]
    fn should_collect_bits_into_bytes() {
        let mut collector = BitCollector::with_capacity(2);
        for bit in BitIterator::new(b"Hi") {
            collector.push_bit(bit).unwrap();
        }
        assert_eq!(collector.bits(), 16);
        assert_eq!(collector.into_bytes(), b"Hi");
    }

    #[test]
    fn should_drop_an_incomplete_trailing_byte() {
        let mut collector = BitCollector::with_capacity(1);
        for bit in BitIterator::new(b"A").chain([1, 0, 1]) {
            collector.push_bit(bit).unwrap();
        }
        assert_eq!(collector.bits(), 11);
        assert_eq!(collector.into_bytes(), b"A");
    }

    #[test]
    fn should_keep_only_the_leading_bits_of_a_chunk() {
        let mut collector = BitCollector::with_capacity(1);
        collector.push_chunk(0b1010, 4, 4).unwrap();
        collector.push_chunk(0b0110, 4, 2).unwrap();
        collector.push_chunk(0b1100, 4, 2).unwrap();
        assert_eq!(collector.into_bytes(), vec![0b1010_0111]);
    }
}

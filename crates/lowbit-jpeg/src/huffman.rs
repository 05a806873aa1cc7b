//! Huffman entropy coding of JPEG scan data.
//!
//! Decoding uses an 8-bit lookup table with a linear fallback for longer
//! codes. Encoding maps every symbol to its `(code, length)` pair.

use crate::error::{JpegError, Result};
use crate::parser::{HuffmanTable, TableClass};

const LUT_BITS: u8 = 8;
const LUT_SIZE: usize = 1 << LUT_BITS;

/// Derives code sizes and codes from the 16 code-length counts (T.81 C.1, C.2).
fn derive_codes(code_lengths: &[u8; 16]) -> Result<(Vec<u8>, Vec<u16>)> {
    let total: usize = code_lengths.iter().map(|&n| n as usize).sum();
    if total > 256 {
        return Err(JpegError::malformed("Huffman table has more than 256 symbols"));
    }

    let sizes: Vec<u8> = code_lengths
        .iter()
        .enumerate()
        .flat_map(|(len, &count)| std::iter::repeat(len as u8 + 1).take(count as usize))
        .collect();

    let mut codes = Vec::with_capacity(total);
    let mut code: u32 = 0;
    let mut current = sizes.first().copied().unwrap_or(0);
    for &size in &sizes {
        while current < size {
            code <<= 1;
            current += 1;
        }
        if code >= (1u32 << size) {
            return Err(JpegError::malformed("Huffman code space overflow"));
        }
        codes.push(code as u16);
        code += 1;
    }
    Ok((sizes, codes))
}

/// Decoding side of a Huffman table.
#[derive(Debug, Clone)]
pub struct HuffmanDecoder {
    /// `(symbol, length)` for every 8-bit prefix; length 0 marks longer codes.
    lut: [(u8, u8); LUT_SIZE],
    codes: Vec<u16>,
    sizes: Vec<u8>,
    values: Vec<u8>,
}

impl HuffmanDecoder {
    pub fn new(table: &HuffmanTable) -> Result<Self> {
        let (sizes, codes) = derive_codes(&table.code_lengths)?;
        if table.values.len() != codes.len() {
            return Err(JpegError::malformed("Huffman table symbol count mismatch"));
        }

        let mut lut = [(0u8, 0u8); LUT_SIZE];
        for ((&code, &size), &symbol) in codes.iter().zip(&sizes).zip(&table.values) {
            if size <= LUT_BITS {
                let shift = LUT_BITS - size;
                let base = (code as usize) << shift;
                lut[base..base + (1 << shift)].fill((symbol, size));
            }
        }

        Ok(HuffmanDecoder {
            lut,
            codes,
            sizes,
            values: table.values.clone(),
        })
    }
}

/// Encoding side of a Huffman table.
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    class: TableClass,
    id: u8,
    codes: [Option<(u16, u8)>; 256],
}

impl HuffmanEncoder {
    pub fn new(table: &HuffmanTable) -> Result<Self> {
        let (sizes, codes) = derive_codes(&table.code_lengths)?;
        let mut map = [None; 256];
        for ((&code, &size), &symbol) in codes.iter().zip(&sizes).zip(&table.values) {
            map[symbol as usize] = Some((code, size));
        }
        Ok(HuffmanEncoder {
            class: table.class,
            id: table.id,
            codes: map,
        })
    }

    pub fn code(&self, symbol: u8) -> Result<(u16, u8)> {
        self.codes[symbol as usize].ok_or(JpegError::MissingHuffmanSymbol {
            class: self.class.name(),
            id: self.id,
            symbol,
        })
    }
}

/// Reads bits from one restart interval of entropy-coded data.
///
/// Removes byte stuffing. Running past the end yields 1-bits, the padding
/// value encoders use.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bits: u32,
    count: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            pos: 0,
            bits: 0,
            count: 0,
        }
    }

    /// Tops up the bit buffer, synthesizing at most four padding bytes past the end.
    fn fill(&mut self) {
        while self.count <= 24 {
            let byte = match self.data.get(self.pos) {
                Some(0xFF) => {
                    // only stuffed bytes can follow inside an interval
                    self.pos += 2;
                    0xFF
                }
                Some(&byte) => {
                    self.pos += 1;
                    byte
                }
                None => {
                    if self.pos >= self.data.len() + 4 {
                        return;
                    }
                    self.pos += 1;
                    0xFF
                }
            };
            self.bits = (self.bits << 8) | byte as u32;
            self.count += 8;
        }
    }

    fn peek(&mut self, count: u8) -> Result<u16> {
        if self.count < count {
            self.fill();
            if self.count < count {
                return Err(JpegError::malformed("entropy-coded data ends prematurely"));
            }
        }
        let mask = (1u32 << count) - 1;
        Ok(((self.bits >> (self.count - count)) & mask) as u16)
    }

    fn consume(&mut self, count: u8) {
        self.count -= count;
    }

    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        if count == 0 {
            return Ok(0);
        }
        let value = self.peek(count)?;
        self.consume(count);
        Ok(value)
    }

    pub fn decode(&mut self, table: &HuffmanDecoder) -> Result<u8> {
        let prefix = self.peek(LUT_BITS)?;
        let (symbol, size) = table.lut[prefix as usize];
        if size > 0 {
            self.consume(size);
            return Ok(symbol);
        }

        for ((&code, &size), &symbol) in table.codes.iter().zip(&table.sizes).zip(&table.values) {
            if size > LUT_BITS && self.peek(size)? == code {
                self.consume(size);
                return Ok(symbol);
            }
        }
        Err(JpegError::malformed("invalid Huffman code in scan"))
    }

    /// Reads `size` magnitude bits and sign-extends them (T.81 F.12).
    pub fn receive_extend(&mut self, size: u8) -> Result<i16> {
        if size == 0 {
            return Ok(0);
        }
        let value = self.read_bits(size)? as i32;
        if value < 1 << (size - 1) {
            Ok((value - (1 << size) + 1) as i16)
        } else {
            Ok(value as i16)
        }
    }
}

/// Writes entropy-coded bits with byte stuffing.
#[derive(Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bits: u32,
    count: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u16, count: u8) {
        if count == 0 {
            return;
        }
        let mask = (1u32 << count) - 1;
        self.bits = (self.bits << count) | (value as u32 & mask);
        self.count += count;
        while self.count >= 8 {
            self.count -= 8;
            self.push_byte((self.bits >> self.count) as u8);
        }
        self.bits &= (1u32 << self.count) - 1;
    }

    pub fn write_symbol(&mut self, symbol: u8, table: &HuffmanEncoder) -> Result<()> {
        let (code, size) = table.code(symbol)?;
        self.write_bits(code, size);
        Ok(())
    }

    fn push_byte(&mut self, byte: u8) {
        self.data.push(byte);
        if byte == 0xFF {
            self.data.push(0x00);
        }
    }

    /// Pads the last byte with 1-bits and returns the stuffed bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if self.count > 0 {
            let padding = 8 - self.count;
            self.write_bits((1 << padding) - 1, padding);
        }
        self.data
    }
}

/// Magnitude category and appended bits of a coefficient (T.81 F.1.2.1).
pub fn magnitude_category(value: i16) -> (u8, u16) {
    if value == 0 {
        return (0, 0);
    }
    let magnitude = value.unsigned_abs();
    let size = (16 - magnitude.leading_zeros()) as u8;
    let bits = if value < 0 {
        ((1u32 << size) - 1 - magnitude as u32) as u16
    } else {
        magnitude
    };
    (size, bits)
}

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

use crate::error::ShnError;

/// Number of bytes requested from the underlying stream per refill.
/// Any size >= 4 works.
const BLOCK_SIZE: usize = 512;

/// Rice parameter of the "how many bits follow" prefix of an adaptive uint.
const UINT_SIZE_K: u32 = 2;

/// MSB-first Golomb-Rice bitstream reader over any `Read` source.
///
/// Shorten packs bits MSB-first: the first bit read from a byte is the most
/// significant bit. Bits are consumed from a 32-bit accumulator loaded four
/// bytes at a time (big-endian) from a read-ahead block.
///
/// One reader is exclusively owned by one parse and reads strictly forward;
/// it is discarded once the embedded header has been consumed.
pub struct BitstreamReader<R: Read> {
    reader: R,
    /// Read-ahead block pulled from `reader`.
    block: Vec<u8>,
    /// Byte position of the next accumulator load within `block`.
    pos: usize,
    /// Bit accumulator; the next bit to read is at `bits_available - 1`.
    bit_buffer: u32,
    /// Number of unconsumed bits in `bit_buffer`.
    bits_available: u32,
}

fn mask(n: u32) -> u32 {
    ((1u64 << n) - 1) as u32
}

impl<R: Read> BitstreamReader<R> {
    pub fn new(reader: R) -> Self {
        BitstreamReader {
            reader,
            block: Vec::new(),
            pos: 0,
            bit_buffer: 0,
            bits_available: 0,
        }
    }

    /// Read a single byte directly from the underlying stream, bypassing the
    /// bit buffer. Only valid before bitstream mode begins (magic + version).
    pub fn read_byte_direct(&mut self) -> Result<u8, ShnError> {
        let mut b = [0u8; 1];
        self.reader
            .read_exact(&mut b)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => ShnError::BitstreamExhausted,
                _ => ShnError::Io(e),
            })?;
        Ok(b[0])
    }

    /// Reload the accumulator with the next 32 bits, pulling a fresh block
    /// from the stream when fewer than 4 buffered bytes remain.
    ///
    /// A block shorter than 4 bytes is end-of-stream. Up to 3 tail bytes of
    /// the previous block are discarded on refill; a short block can only
    /// occur at end-of-data, so no header bit is ever lost this way.
    fn refill_bit_buffer(&mut self) -> Result<(), ShnError> {
        if self.block.len() - self.pos < 4 {
            let mut block = vec![0u8; BLOCK_SIZE];
            let mut filled = 0;
            // Short reads are only allowed at end-of-data, so keep reading
            // until the block is full or the stream is done.
            while filled < BLOCK_SIZE {
                let n = self.reader.read(&mut block[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            if filled < 4 {
                return Err(ShnError::BitstreamExhausted);
            }
            block.truncate(filled);
            self.block = block;
            self.pos = 0;
        }
        self.bit_buffer = BigEndian::read_u32(&self.block[self.pos..]);
        self.pos += 4;
        self.bits_available = 32;
        Ok(())
    }

    /// Decode one unsigned Golomb-Rice value with parameter `k`.
    ///
    /// Unary quotient (zero bits up to a terminating one bit), then `k`
    /// literal remainder bits: value = `(q << k) | r`.
    pub fn decode_rice(&mut self, k: u32) -> Result<u32, ShnError> {
        if self.bits_available == 0 {
            self.refill_bit_buffer()?;
        }

        let mut value: u32 = 0;
        loop {
            self.bits_available -= 1;
            if self.bit_buffer & (1 << self.bits_available) != 0 {
                break;
            }
            value += 1;
            if self.bits_available == 0 {
                self.refill_bit_buffer()?;
            }
        }

        let mut k = k;
        while k != 0 {
            if self.bits_available >= k {
                value = (value << k) | ((self.bit_buffer >> (self.bits_available - k)) & mask(k));
                self.bits_available -= k;
                k = 0;
            } else {
                value = (value << self.bits_available) | (self.bit_buffer & mask(self.bits_available));
                k -= self.bits_available;
                self.refill_bit_buffer()?;
            }
        }

        Ok(value)
    }

    /// Decode one adaptive unsigned integer.
    ///
    /// For `version > 0` the effective Rice parameter is itself transmitted
    /// first, Rice-coded with parameter 2, and replaces `default_k`; for
    /// `version == 0` the caller-supplied `default_k` is used directly.
    pub fn decode_uint(&mut self, version: u8, default_k: u32) -> Result<u32, ShnError> {
        let effective_k = if version > 0 {
            self.decode_rice(UINT_SIZE_K)?
        } else {
            default_k
        };
        // A width decoded from a corrupt stream must not shift past the
        // accumulator.
        if effective_k > 31 {
            return Err(ShnError::CodeParameterOutOfRange(effective_k));
        }
        self.decode_rice(effective_k)
    }
}

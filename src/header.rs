use std::io::Read;

use crate::bitstream::BitstreamReader;
use crate::error::ShnError;

/// Shorten magic bytes.
pub const MAGIC: &[u8; 4] = b"ajkg";

const MIN_SUPPORTED_VERSION: u8 = 1;
const MAX_SUPPORTED_VERSION: u8 = 3;

/// Function code of a verbatim (literal) block.
const FN_VERBATIM: u32 = 9;

const MAX_CHANNEL_COUNT: u32 = 8;
const MAX_BLOCKSIZE: u32 = 65535;

/// Smallest embedded header we accept: a canonical 44-byte WAVE header.
const MIN_HEADER_SIZE: u32 = 44;
/// Largest verbatim chunk the format allows.
const MAX_HEADER_SIZE: u32 = 256;

// Default Rice parameters for the stream-level fields (version 0 only;
// later versions transmit the width in-stream).
const FILE_TYPE_SIZE: u32 = 4;
const CHANNEL_COUNT_SIZE: u32 = 0;
const BLOCKSIZE_SIZE: u32 = 8; // log2 of the default block size, 256
const LPCQ_SIZE: u32 = 2;
const NMEAN_SIZE: u32 = 0;
const SKIP_BYTES_SIZE: u32 = 1;
const EXTRA_BYTE_SIZE: u32 = 7;

// Rice parameters of the verbatim block framing.
const FN_SIZE: u32 = 2;
const VERBATIM_CHUNK_SIZE_SIZE: u32 = 5;
const VERBATIM_BYTE_SIZE: u32 = 8;

/// Properties declared by the compressed stream itself, before the
/// embedded container header.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub version: u8,
    pub file_type: u32,
    pub channels: u32,
}

/// Returns true if `prefix` starts with the Shorten magic bytes.
pub fn is_shorten(prefix: &[u8]) -> bool {
    prefix.len() >= MAGIC.len() && &prefix[..MAGIC.len()] == MAGIC
}

/// Read the magic, version and stream-level fields, leaving the reader
/// positioned at the first function code.
///
/// For version > 0 the block size, LPC order, mean count and skip bytes
/// are present as well; they carry nothing the properties need but must
/// be consumed (and sanity-checked) to reach the verbatim block.
pub fn read_stream_info<R: Read>(
    reader: &mut BitstreamReader<R>,
) -> Result<StreamInfo, ShnError> {
    let mut magic = [0u8; 4];
    for b in magic.iter_mut() {
        *b = reader.read_byte_direct()?;
    }
    if &magic != MAGIC {
        return Err(ShnError::BadMagic);
    }

    let version = reader.read_byte_direct()?;
    if !(MIN_SUPPORTED_VERSION..=MAX_SUPPORTED_VERSION).contains(&version) {
        return Err(ShnError::UnsupportedVersion(version));
    }

    // From here on every field is Rice-coded.
    let file_type = reader.decode_uint(version, FILE_TYPE_SIZE)?;

    let channels = reader.decode_uint(version, CHANNEL_COUNT_SIZE)?;
    if channels == 0 || channels > MAX_CHANNEL_COUNT {
        return Err(ShnError::InvalidChannelCount(channels));
    }

    if version > 0 {
        let blocksize = reader.decode_uint(version, BLOCKSIZE_SIZE)?;
        if blocksize == 0 || blocksize > MAX_BLOCKSIZE {
            return Err(ShnError::InvalidBlockSize(blocksize));
        }

        reader.decode_uint(version, LPCQ_SIZE)?; // maxnlpc
        reader.decode_uint(version, NMEAN_SIZE)?; // nmean

        let skip_count = reader.decode_uint(version, SKIP_BYTES_SIZE)?;
        for _ in 0..skip_count {
            reader.decode_uint(version, EXTRA_BYTE_SIZE)?;
        }
    }

    Ok(StreamInfo {
        version,
        file_type,
        channels,
    })
}

/// Extract the raw container header bytes from the mandatory verbatim block.
///
/// The first function code must be a verbatim block whose length lies in
/// [44, 256]; each of its bytes is Rice-coded individually with k = 8.
pub fn read_verbatim_header<R: Read>(
    reader: &mut BitstreamReader<R>,
) -> Result<Vec<u8>, ShnError> {
    let function = reader.decode_rice(FN_SIZE)?;
    if function != FN_VERBATIM {
        return Err(ShnError::MissingVerbatimBlock(function));
    }

    let size = reader.decode_rice(VERBATIM_CHUNK_SIZE_SIZE)?;
    if !(MIN_HEADER_SIZE..=MAX_HEADER_SIZE).contains(&size) {
        return Err(ShnError::InvalidHeaderSize(size));
    }

    let mut header = Vec::with_capacity(size as usize);
    for _ in 0..size {
        header.push(reader.decode_rice(VERBATIM_BYTE_SIZE)? as u8);
    }
    Ok(header)
}

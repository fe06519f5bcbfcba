use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::ShnError;

const WAVE_FORMAT_PCM: u16 = 0x0001;

/// Properties declared by the embedded WAVE or AIFF header.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub channels: u32,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    pub sample_frames: u64,
}

fn be_u16(data: &[u8], off: usize) -> Result<u16, ShnError> {
    data.get(off..off + 2)
        .map(BigEndian::read_u16)
        .ok_or(ShnError::MalformedChunk)
}

fn be_u32(data: &[u8], off: usize) -> Result<u32, ShnError> {
    data.get(off..off + 4)
        .map(BigEndian::read_u32)
        .ok_or(ShnError::MalformedChunk)
}

fn be_u64(data: &[u8], off: usize) -> Result<u64, ShnError> {
    data.get(off..off + 8)
        .map(BigEndian::read_u64)
        .ok_or(ShnError::MalformedChunk)
}

fn le_u16(data: &[u8], off: usize) -> Result<u16, ShnError> {
    data.get(off..off + 2)
        .map(LittleEndian::read_u16)
        .ok_or(ShnError::MalformedChunk)
}

fn le_u32(data: &[u8], off: usize) -> Result<u32, ShnError> {
    data.get(off..off + 4)
        .map(LittleEndian::read_u32)
        .ok_or(ShnError::MalformedChunk)
}

fn chunk_id(data: &[u8], off: usize) -> Result<[u8; 4], ShnError> {
    data.get(off..off + 4)
        .map(|s| [s[0], s[1], s[2], s[3]])
        .ok_or(ShnError::MalformedChunk)
}

/// Which of the two supported container layouts the header uses.
/// Chosen once from the leading tag; each variant carries its own
/// chunk-walk rules (endianness, padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Wave,
    Aiff,
}

/// Parse the raw header bytes captured in the verbatim block.
///
/// Layout: bytes 0-3 are the outer container tag ('RIFF' or 'FORM'),
/// bytes 4-7 the outer size (ignored; the header is truncated anyway),
/// and the chunks follow from byte 8. The caller guarantees at least 44
/// bytes.
pub fn parse_container(header: &[u8]) -> Result<ContainerInfo, ShnError> {
    let container = match &chunk_id(header, 0)? {
        b"RIFF" => Container::Wave,
        b"FORM" => Container::Aiff,
        _ => return Err(ShnError::UnsupportedContainerFormat),
    };
    let chunk_data = &header[8..];

    match container {
        Container::Wave => parse_wave_chunks(chunk_data),
        Container::Aiff => parse_aiff_chunks(chunk_data),
    }
}

/// Walk the chunks of a RIFF/WAVE header: 4-byte big-endian id, 4-byte
/// little-endian size.
///
/// Unknown chunks are skipped by their declared size with no even-padding
/// adjustment. That differs from the conventional RIFF rule (and from the
/// AIFF walk below); headers captured by real encoders only ever carry
/// 'fmt ' and 'data' here, so the distinction has never been observed to
/// matter. Do not "fix" it without checking real odd-chunk files first.
fn parse_wave_chunks(data: &[u8]) -> Result<ContainerInfo, ShnError> {
    if chunk_id(data, 0)? != *b"WAVE" {
        return Err(ShnError::NotWaveFile);
    }

    let mut offset = 4;
    let mut saw_format_chunk = false;
    let mut channels = 0u32;
    let mut sample_rate = 0u32;
    let mut bits_per_sample = 0u32;
    let mut block_align = 0u16;
    let mut data_chunk_size = 0u32;

    while offset < data.len() {
        let id = chunk_id(data, offset)?;
        offset += 4;
        let size = le_u32(data, offset)?;
        offset += 4;

        match &id {
            b"fmt " => {
                if size < 16 {
                    return Err(ShnError::FmtChunkTooSmall(size));
                }

                let format_tag = le_u16(data, offset)?;
                offset += 2;
                if format_tag != WAVE_FORMAT_PCM {
                    return Err(ShnError::UnsupportedWaveFormat(format_tag));
                }

                channels = le_u16(data, offset)? as u32;
                offset += 2;

                sample_rate = le_u32(data, offset)?;
                offset += 4;

                // Average bytes per second, unused.
                offset += 4;

                block_align = le_u16(data, offset)?;
                offset += 2;

                bits_per_sample = le_u16(data, offset)? as u32;
                offset += 2;

                saw_format_chunk = true;
            }
            // The payload is not present in the truncated header; only the
            // declared size is informative.
            b"data" => data_chunk_size = size,
            _ => offset = offset.saturating_add(size as usize),
        }
    }

    if !saw_format_chunk {
        return Err(ShnError::MissingFmtChunk);
    }

    let sample_frames = if data_chunk_size != 0 && block_align != 0 {
        (data_chunk_size / block_align as u32) as u64
    } else {
        0
    };

    Ok(ContainerInfo {
        channels,
        sample_rate,
        bits_per_sample,
        sample_frames,
    })
}

/// Walk the chunks of a FORM/AIFF header: 4-byte big-endian id, 4-byte
/// big-endian size. Every chunk occupies an even number of bytes but the
/// pad byte is not included in the declared size, so skipping uses the
/// size rounded up to even.
fn parse_aiff_chunks(data: &[u8]) -> Result<ContainerInfo, ShnError> {
    let form_type = chunk_id(data, 0)?;
    if form_type != *b"AIFF" && form_type != *b"AIFC" {
        return Err(ShnError::NotAiffFile);
    }

    let mut offset = 4;
    let mut saw_common_chunk = false;
    let mut channels = 0u32;
    let mut sample_rate = 0u32;
    let mut bits_per_sample = 0u32;
    let mut sample_frames = 0u64;

    while offset < data.len() {
        let id = chunk_id(data, offset)?;
        offset += 4;
        let size = be_u32(data, offset)?;
        offset += 4;
        let padded_size = usize::try_from(size as u64 + (size as u64 & 1)).unwrap_or(usize::MAX);

        match &id {
            b"COMM" => {
                if size < 18 {
                    return Err(ShnError::CommChunkTooSmall(size));
                }

                channels = be_u16(data, offset)? as u32;
                offset += 2;

                sample_frames = be_u32(data, offset)? as u64;
                offset += 4;

                bits_per_sample = be_u16(data, offset)? as u32;
                offset += 2;

                sample_rate = decode_extended_sample_rate(
                    be_u16(data, offset)?,
                    be_u64(data, offset + 2)?,
                )?;
                offset += 10;

                saw_common_chunk = true;
            }
            _ => offset = offset.saturating_add(padded_size),
        }
    }

    if !saw_common_chunk {
        return Err(ShnError::MissingCommChunk);
    }

    Ok(ContainerInfo {
        channels,
        sample_rate,
        bits_per_sample,
        sample_frames,
    })
}

/// Decode the 80-bit extended-precision sample rate of a 'COMM' chunk.
///
/// The field is a 16-bit biased exponent followed by a 64-bit mantissa
/// with an explicit integer bit. Unbiasing subtracts 16383 and a further
/// 63 to normalize against the mantissa width; the rate is then the
/// mantissa shifted by the exponent, rounding to nearest on right shifts.
/// Integer arithmetic only, so the result is identical on every platform.
fn decode_extended_sample_rate(
    biased_exponent: u16,
    mantissa: u64,
) -> Result<u32, ShnError> {
    let exponent = biased_exponent as i32 - 16383 - 63;
    if !(-63..=63).contains(&exponent) {
        return Err(ShnError::ExponentOutOfRange(exponent));
    }

    let rate = if exponent >= 0 {
        mantissa << exponent
    } else {
        (mantissa + (1u64 << (-exponent - 1))) >> -exponent
    };
    Ok(rate as u32)
}

use std::io;

/// Errors that can occur while reading properties from a Shorten file.
///
/// Every error is terminal for the parse: the caller gets either a fully
/// populated [`crate::AudioProperties`] or one of these, never a partial
/// result. The only non-fatal condition (a channel-count mismatch between
/// the Shorten header and the embedded container header) is logged as a
/// warning instead.
#[derive(Debug, thiserror::Error)]
pub enum ShnError {
    /// The file does not start with the Shorten magic bytes `ajkg`.
    #[error("not a Shorten file (invalid magic)")]
    BadMagic,

    /// The file version is outside the supported range (1-3).
    #[error("unsupported Shorten version: {0}")]
    UnsupportedVersion(u8),

    /// The stream ended before a Golomb-Rice decode could complete.
    #[error("bitstream exhausted before decode completed")]
    BitstreamExhausted,

    /// A stream-encoded Rice parameter is too large to be a real bit width.
    #[error("Rice code parameter out of range: {0}")]
    CodeParameterOutOfRange(u32),

    /// The channel count declared by the Shorten header is 0 or above 8.
    #[error("invalid channel count: {0}")]
    InvalidChannelCount(u32),

    /// The block size declared by the Shorten header is 0 or above 65535.
    #[error("invalid block size: {0}")]
    InvalidBlockSize(u32),

    /// The first function code in the bitstream is not a verbatim block,
    /// so there is no embedded container header to parse.
    #[error("missing initial verbatim block (function code {0})")]
    MissingVerbatimBlock(u32),

    /// The embedded header length is outside [44, 256].
    #[error("embedded header size out of range: {0}")]
    InvalidHeaderSize(u32),

    /// A 'RIFF' container without 'WAVE' as its format tag.
    #[error("missing 'WAVE' in 'RIFF' chunk")]
    NotWaveFile,

    /// A 'FORM' container without 'AIFF' or 'AIFC' as its format tag.
    #[error("missing 'AIFF' or 'AIFC' in 'FORM' chunk")]
    NotAiffFile,

    /// The 'fmt ' chunk is shorter than the 16 bytes of a PCM format block.
    #[error("'fmt ' chunk is too small: {0} bytes")]
    FmtChunkTooSmall(u32),

    /// The WAVE format tag is not 1 (PCM).
    #[error("unsupported WAVE format tag: {0:#06x}")]
    UnsupportedWaveFormat(u16),

    /// The WAVE header contains no 'fmt ' chunk.
    #[error("missing 'fmt ' chunk")]
    MissingFmtChunk,

    /// The 'COMM' chunk is shorter than the 18 bytes of a common chunk.
    #[error("'COMM' chunk is too small: {0} bytes")]
    CommChunkTooSmall(u32),

    /// The AIFF header contains no 'COMM' chunk.
    #[error("missing 'COMM' chunk")]
    MissingCommChunk,

    /// The 80-bit sample-rate exponent is outside [-63, 63].
    #[error("sample rate exponent out of range: {0}")]
    ExponentOutOfRange(i32),

    /// A chunk's declared contents run past the end of the header bytes.
    #[error("malformed chunk in embedded header")]
    MalformedChunk,

    /// The embedded header is neither RIFF/WAVE nor FORM/AIFF.
    #[error("unsupported container format")]
    UnsupportedContainerFormat,

    /// Shorten files are read-only; there is no encoder for this format.
    #[error("saving is not supported for Shorten files")]
    SaveNotSupported,

    /// A wrapped I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not a Shorten file at all.
    BadMagic,
    /// A Shorten file, but a version this crate does not read.
    UnsupportedVersion,
    /// The stream ran out mid-decode.
    BitstreamExhausted,
    /// A decoded value violated a structural invariant.
    Validation,
    /// The embedded container header is missing or not a supported format.
    UnsupportedContainer,
    /// Writing was attempted on a read-only format.
    ReadOnly,
    /// An I/O failure unrelated to the format itself.
    Io,
}

impl ShnError {
    /// The coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShnError::BadMagic => ErrorKind::BadMagic,
            ShnError::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            ShnError::BitstreamExhausted => ErrorKind::BitstreamExhausted,
            ShnError::CodeParameterOutOfRange(_)
            | ShnError::InvalidChannelCount(_)
            | ShnError::InvalidBlockSize(_)
            | ShnError::MissingVerbatimBlock(_)
            | ShnError::InvalidHeaderSize(_)
            | ShnError::FmtChunkTooSmall(_)
            | ShnError::MissingFmtChunk
            | ShnError::CommChunkTooSmall(_)
            | ShnError::MissingCommChunk
            | ShnError::ExponentOutOfRange(_)
            | ShnError::MalformedChunk => ErrorKind::Validation,
            ShnError::NotWaveFile
            | ShnError::NotAiffFile
            | ShnError::UnsupportedWaveFormat(_)
            | ShnError::UnsupportedContainerFormat => ErrorKind::UnsupportedContainer,
            ShnError::SaveNotSupported => ErrorKind::ReadOnly,
            ShnError::Io(_) => ErrorKind::Io,
        }
    }
}

use crate::container::ContainerInfo;
use crate::header::StreamInfo;

/// Audio properties of a Shorten file.
///
/// Combines what the compressed stream declares about itself (version,
/// file type, channel count) with what the embedded WAVE or AIFF header
/// declares (sample rate, bit depth, frame count). Produced once per
/// parse and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AudioProperties {
    /// Shorten format version (1-3).
    pub version: u8,
    /// Shorten file-type code (e.g. 5 = signed 16-bit little-endian).
    pub file_type: u32,
    /// Number of audio channels, as declared by the Shorten header.
    pub channels: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (typically 16).
    pub bits_per_sample: u32,
    /// Total sample frames, or 0 when the header does not say.
    pub sample_frames: u64,
}

/// Combine stream-level and container-level properties.
///
/// Pure composition; all validation already happened during parsing. This
/// is the one place a channel-count disagreement between the two headers
/// is reported, and it is a warning rather than an error: the stream-level
/// count wins.
pub(crate) fn assemble(stream: &StreamInfo, container: &ContainerInfo) -> AudioProperties {
    if stream.channels != container.channels {
        log::warn!(
            "channel count mismatch: Shorten header says {}, container header says {}",
            stream.channels,
            container.channels
        );
    }

    AudioProperties {
        version: stream.version,
        file_type: stream.file_type,
        channels: stream.channels,
        sample_rate: container.sample_rate,
        bits_per_sample: container.bits_per_sample,
        sample_frames: container.sample_frames,
    }
}

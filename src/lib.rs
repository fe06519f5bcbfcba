//! Pure Rust audio properties reader for Shorten (SHN) lossless audio files.
//!
//! Reads sample rate, channel count, bit depth and frame count from a
//! Shorten file without decompressing any audio. Shorten captures the
//! original RIFF/WAVE or FORM/AIFF header verbatim at compression time;
//! this crate decodes just enough of the Golomb-Rice bitstream to pull
//! that header back out and interpret it.
//!
//! Implemented from:
//! - T. Robinson, "SHORTEN: Simple lossless and near-lossless waveform
//!   compression" (Cambridge University Engineering Dept, TR-156, 1994)
//! - Library of Congress format description fdd000199
//!
//! The format is read-only by design: no Shorten encoder exists in the
//! wild worth targeting, and [`ShnFile::save`] always fails.
//!
//! # Example
//!
//! ```no_run
//! use shn_meta::ShnFile;
//!
//! let file = ShnFile::open("track.shn").unwrap();
//! let props = file.properties();
//! println!(
//!     "{}ch, {}Hz, {}bit, {} frames",
//!     props.channels, props.sample_rate, props.bits_per_sample, props.sample_frames
//! );
//! ```

mod bitstream;
mod container;
pub mod error;
mod header;
mod properties;

use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use error::{ErrorKind, ShnError};
pub use properties::AudioProperties;

/// Returns true if `prefix` looks like the start of a Shorten file.
///
/// Checks the 4-byte `ajkg` magic only; useful for format sniffing
/// without committing to a parse.
pub fn is_shorten(prefix: &[u8]) -> bool {
    header::is_shorten(prefix)
}

/// A Shorten file whose audio properties have been read.
///
/// Parsing happens entirely in the constructor: on success the properties
/// are complete and immutable, on failure no partial object exists. One
/// parse owns its bitstream reader exclusively and reads strictly forward,
/// so the source only needs to be `Read`.
#[derive(Debug)]
pub struct ShnFile {
    properties: AudioProperties,
}

impl ShnFile {
    /// Open a Shorten file by path and read its properties.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ShnError> {
        let file = File::open(path)?;
        Self::new(file)
    }

    /// Read properties from any `Read` source.
    ///
    /// Consumes the stream up to the end of the embedded container header;
    /// the compressed audio payload is never touched.
    pub fn new<R: Read>(reader: R) -> Result<Self, ShnError> {
        let mut bits = bitstream::BitstreamReader::new(reader);
        let stream_info = header::read_stream_info(&mut bits)?;
        let raw_header = header::read_verbatim_header(&mut bits)?;
        let container_info = container::parse_container(&raw_header)?;
        let properties = properties::assemble(&stream_info, &container_info);
        Ok(ShnFile { properties })
    }

    /// The audio properties read at construction.
    pub fn properties(&self) -> &AudioProperties {
        &self.properties
    }

    /// Shorten is a read-only format; this always fails with
    /// [`ShnError::SaveNotSupported`].
    pub fn save(&self) -> Result<(), ShnError> {
        Err(ShnError::SaveNotSupported)
    }
}

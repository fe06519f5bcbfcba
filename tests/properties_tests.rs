use shn_meta::{ErrorKind, ShnError, ShnFile};

/// MSB-first bit packer used to build synthetic Shorten streams, the
/// encoding counterpart of the crate's Rice decoder.
struct BitWriter {
    bytes: Vec<u8>,
    cur: u8,
    nbits: u32,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter { bytes: Vec::new(), cur: 0, nbits: 0 }
    }

    fn put_bit(&mut self, bit: u32) {
        self.cur = (self.cur << 1) | (bit as u8 & 1);
        self.nbits += 1;
        if self.nbits == 8 {
            self.bytes.push(self.cur);
            self.cur = 0;
            self.nbits = 0;
        }
    }

    fn put_rice(&mut self, k: u32, v: u32) {
        for _ in 0..(v >> k) {
            self.put_bit(0);
        }
        self.put_bit(1);
        for i in (0..k).rev() {
            self.put_bit(v >> i);
        }
    }

    /// Adaptive uint: width prefix (Rice k=2) then the value.
    fn put_uint(&mut self, v: u32) {
        let nbits = 32 - v.leading_zeros();
        self.put_rice(2, nbits);
        self.put_rice(nbits, v);
    }

    /// Flush, padding the bitstream to a 4-byte boundary so every bit is
    /// reachable through the reader's 32-bit refill.
    fn finish(mut self) -> Vec<u8> {
        while self.nbits != 0 {
            self.put_bit(0);
        }
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }
        self.bytes
    }
}

/// Build a complete synthetic Shorten file: magic, version, stream-level
/// fields, then a verbatim block carrying `embedded_header`.
fn build_shn_file(version: u8, channels: u32, embedded_header: &[u8]) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.put_uint(5); // file type: signed 16-bit little-endian
    w.put_uint(channels);
    w.put_uint(256); // blocksize
    w.put_uint(0); // maxnlpc
    w.put_uint(0); // nmean
    w.put_uint(0); // skip bytes
    w.put_rice(2, 9); // verbatim function code
    w.put_rice(5, embedded_header.len() as u32);
    for &b in embedded_header {
        w.put_rice(8, b as u32);
    }

    let mut file = Vec::new();
    file.extend_from_slice(b"ajkg");
    file.push(version);
    file.extend_from_slice(&w.finish());
    file
}

fn canonical_wave_header(
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    block_align: u16,
    data_size: u32,
) -> Vec<u8> {
    let mut h = Vec::new();
    h.extend_from_slice(b"RIFF");
    h.extend_from_slice(&(36 + data_size).to_le_bytes());
    h.extend_from_slice(b"WAVE");
    h.extend_from_slice(b"fmt ");
    h.extend_from_slice(&16u32.to_le_bytes());
    h.extend_from_slice(&1u16.to_le_bytes()); // PCM
    h.extend_from_slice(&channels.to_le_bytes());
    h.extend_from_slice(&sample_rate.to_le_bytes());
    h.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    h.extend_from_slice(&block_align.to_le_bytes());
    h.extend_from_slice(&bits_per_sample.to_le_bytes());
    h.extend_from_slice(b"data");
    h.extend_from_slice(&data_size.to_le_bytes());
    h
}

fn canonical_aiff_header(channels: u16, sample_frames: u32, bits_per_sample: u16) -> Vec<u8> {
    // Sample rate fixed at 44100.0: 80-bit extended float with biased
    // exponent 16398 and mantissa 0xAC44 << 48.
    let mut h = Vec::new();
    h.extend_from_slice(b"FORM");
    h.extend_from_slice(&46u32.to_be_bytes());
    h.extend_from_slice(b"AIFF");
    h.extend_from_slice(b"COMM");
    h.extend_from_slice(&18u32.to_be_bytes());
    h.extend_from_slice(&channels.to_be_bytes());
    h.extend_from_slice(&sample_frames.to_be_bytes());
    h.extend_from_slice(&bits_per_sample.to_be_bytes());
    h.extend_from_slice(&16398u16.to_be_bytes());
    h.extend_from_slice(&(0xAC44u64 << 48).to_be_bytes());
    h.extend_from_slice(b"SSND");
    h.extend_from_slice(&0u32.to_be_bytes());
    h
}

#[test]
fn wave_file_end_to_end() {
    let header = canonical_wave_header(2, 44100, 16, 4, 176_400);
    let data = build_shn_file(2, 2, &header);

    let file = ShnFile::new(&data[..]).expect("failed to parse synthetic SHN");
    let props = file.properties();
    assert_eq!(props.version, 2);
    assert_eq!(props.file_type, 5);
    assert_eq!(props.channels, 2);
    assert_eq!(props.sample_rate, 44100);
    assert_eq!(props.bits_per_sample, 16);
    assert_eq!(props.sample_frames, 44100);
}

#[test]
fn aiff_file_end_to_end() {
    let header = canonical_aiff_header(2, 44100, 16);
    let data = build_shn_file(2, 2, &header);

    let file = ShnFile::new(&data[..]).expect("failed to parse synthetic SHN");
    let props = file.properties();
    assert_eq!(props.channels, 2);
    assert_eq!(props.sample_rate, 44100);
    assert_eq!(props.bits_per_sample, 16);
    assert_eq!(props.sample_frames, 44100);
}

#[test]
fn all_supported_versions_parse() {
    let header = canonical_wave_header(1, 22050, 8, 1, 22050);
    for version in 1..=3 {
        let data = build_shn_file(version, 1, &header);
        let file = ShnFile::new(&data[..])
            .unwrap_or_else(|e| panic!("version {version}: {e}"));
        assert_eq!(file.properties().version, version);
        assert_eq!(file.properties().sample_rate, 22050);
    }
}

#[test]
fn bad_magic_is_invalid_not_a_panic() {
    let data = b"OggS\x00\x00\x00\x00\x00\x00\x00\x00";
    let err = ShnFile::new(&data[..]).unwrap_err();
    assert!(matches!(err, ShnError::BadMagic));
    assert_eq!(err.kind(), ErrorKind::BadMagic);
}

#[test]
fn unsupported_version_is_rejected() {
    let mut data = build_shn_file(2, 2, &canonical_wave_header(2, 44100, 16, 4, 0));
    data[4] = 4;
    assert!(matches!(
        ShnFile::new(&data[..]),
        Err(ShnError::UnsupportedVersion(4))
    ));
}

#[test]
fn out_of_range_channel_counts_abort_before_container_parse() {
    for channels in [0u32, 9] {
        let data = build_shn_file(2, channels, &canonical_wave_header(2, 44100, 16, 4, 0));
        let err = ShnFile::new(&data[..]).unwrap_err();
        assert!(
            matches!(err, ShnError::InvalidChannelCount(c) if c == channels),
            "channels {channels}: {err}"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn truncated_stream_is_deterministic_exhaustion() {
    let data = build_shn_file(2, 2, &canonical_wave_header(2, 44100, 16, 4, 176_400));
    // Cut inside the verbatim block, past the stream-level fields.
    for cut in [8, 16, 32, data.len() - 4] {
        let err = ShnFile::new(&data[..cut]).unwrap_err();
        assert!(
            matches!(err, ShnError::BitstreamExhausted),
            "cut {cut}: {err}"
        );
    }
}

#[test]
fn missing_verbatim_block_is_rejected() {
    let mut w = BitWriter::new();
    w.put_uint(5);
    w.put_uint(2);
    w.put_uint(256);
    w.put_uint(0);
    w.put_uint(0);
    w.put_uint(0);
    w.put_rice(2, 0); // FN_DIFF0 where the verbatim block should be
    w.put_rice(5, 44);
    let mut data = Vec::from(&b"ajkg\x02"[..]);
    data.extend_from_slice(&w.finish());

    assert!(matches!(
        ShnFile::new(&data[..]),
        Err(ShnError::MissingVerbatimBlock(0))
    ));
}

#[test]
fn wave_header_missing_fmt_chunk() {
    let mut header = Vec::new();
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&36u32.to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"data");
    header.extend_from_slice(&176_400u32.to_le_bytes());
    header.resize(44, 0); // pad: the trailing zeros read as one empty chunk
    let data = build_shn_file(2, 2, &header);

    let err = ShnFile::new(&data[..]).unwrap_err();
    assert!(matches!(err, ShnError::MissingFmtChunk), "{err}");
}

#[test]
fn aiff_header_missing_comm_chunk() {
    let mut header = Vec::new();
    header.extend_from_slice(b"FORM");
    header.extend_from_slice(&40u32.to_be_bytes());
    header.extend_from_slice(b"AIFF");
    header.extend_from_slice(b"SSND");
    header.extend_from_slice(&24u32.to_be_bytes());
    header.resize(44, 0);
    let data = build_shn_file(2, 2, &header);

    let err = ShnFile::new(&data[..]).unwrap_err();
    assert!(matches!(err, ShnError::MissingCommChunk), "{err}");
}

#[test]
fn channel_count_mismatch_is_a_warning_not_an_error() {
    // Stream says mono, embedded WAVE header says stereo.
    let header = canonical_wave_header(2, 48000, 16, 4, 192_000);
    let data = build_shn_file(2, 1, &header);

    let file = ShnFile::new(&data[..]).expect("mismatch must not abort the parse");
    // The stream-level count wins.
    assert_eq!(file.properties().channels, 1);
    assert_eq!(file.properties().sample_rate, 48000);
}

#[test]
fn save_is_uniformly_unsupported() {
    let data = build_shn_file(2, 2, &canonical_wave_header(2, 44100, 16, 4, 176_400));
    let file = ShnFile::new(&data[..]).unwrap();
    let err = file.save().unwrap_err();
    assert!(matches!(err, ShnError::SaveNotSupported));
    assert_eq!(err.kind(), ErrorKind::ReadOnly);
}

#[test]
fn sniffing_a_prefix() {
    let data = build_shn_file(2, 2, &canonical_wave_header(2, 44100, 16, 4, 0));
    assert!(shn_meta::is_shorten(&data));
    assert!(!shn_meta::is_shorten(b"RIFFxxxx"));
}

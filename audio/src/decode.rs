//! Container demuxing and decoding using Symphonia.
//!
//! Accepts any container/codec pair Symphonia knows (WAV, MP3, MP4/M4A,
//! AAC/ADTS, FLAC, OGG/Vorbis). Decoding works purely on an in-memory buffer.

use std::any::Any;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::AudioError;
use crate::format::ContainerFormat;

/// Interleaved PCM as produced by the codec, before any conversion.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved f32 samples in [-1, 1].
    pub samples: Vec<f32>,
    /// Native sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: usize,
}

impl DecodedAudio {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    /// Averages all channels into a single channel.
    pub fn into_mono(self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples;
        }
        downmix_to_mono(&self.samples, self.channels)
    }
}

/// Decodes an encoded buffer into interleaved f32 PCM.
///
/// `declared` is used only as a probe hint; the container is always sniffed.
pub fn decode(bytes: &[u8], declared: Option<ContainerFormat>) -> Result<DecodedAudio, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::Empty);
    }

    let mut hint = Hint::new();
    if let Some(fmt) = declared {
        if !fmt.is_decodable() {
            return Err(AudioError::UnsupportedCodec(format!("{fmt} has no decoder")));
        }
        hint.with_extension(fmt.extension());
    }

    // Demuxers and codecs run on untrusted bytes; a panic inside them is a decode failure.
    panic::catch_unwind(AssertUnwindSafe(|| decode_stream(bytes, &hint))).unwrap_or_else(|payload| {
        let reason = panic_message(payload.as_ref());
        warn!(reason, "decoder panicked");
        Err(AudioError::Decode(format!("decoder panicked: {reason}")))
    })
}

fn decode_stream(bytes: &[u8], hint: &Hint) -> Result<DecodedAudio, AudioError> {
    // The stream owns its source; the copy is dropped with the reader on every path.
    let source = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let probed = symphonia::default::get_probe()
        .format(hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::Probe(e.to_string()))?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => AudioError::UnsupportedCodec(what.to_string()),
            other => AudioError::Decode(other.to_string()),
        })?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut skipped = 0usize;

    loop {
        let packet = match reader.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("skipping corrupt packet: {}", e);
                skipped += 1;
                continue;
            }
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count();

        let needs_alloc = sample_buf
            .as_ref()
            .map_or(true, |b| b.capacity() < decoded.capacity());
        if needs_alloc {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() || channels == 0 {
        return Err(AudioError::NoSamples);
    }
    if sample_rate == 0 {
        return Err(AudioError::Decode("unknown sample rate".into()));
    }

    debug!(
        samples = samples.len(),
        sample_rate,
        channels,
        skipped_packets = skipped,
        "decoded audio"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Averages interleaved multi-channel audio into mono.
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn downmix_averages_channels() {
        let stereo = vec![1.0, 0.0, 0.5, 0.5, 0.0, 1.0];
        let mono = downmix_to_mono(&stereo, 2);
        assert_eq!(mono.len(), 3);
        for v in mono {
            assert!((v - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn downmix_drops_partial_frame() {
        let mono = downmix_to_mono(&[1.0, 1.0, 1.0], 2);
        assert_eq!(mono, vec![1.0]);
    }

    #[test]
    fn decode_empty_buffer() {
        assert!(matches!(decode(&[], None), Err(AudioError::Empty)));
    }

    /// Deterministic xorshift64 bytes.
    fn noise_bytes(seed: u64, len: usize) -> Vec<u8> {
        let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn decode_garbage_fails() {
        let garbage = b"this is plainly not an audio container, just text".repeat(20);
        assert!(decode(&garbage, None).is_err());
    }

    #[test]
    fn decode_random_bytes_fails_without_panicking() {
        for seed in 0..200u64 {
            let len = 4096 + (seed as usize * 37) % 8192;
            let bytes = noise_bytes(seed, len);
            assert!(decode(&bytes, None).is_err(), "seed {seed} decoded");
        }
    }

    #[test]
    fn decode_sync_heavy_bytes_does_not_panic() {
        // Dense 0xFFF sync words drive the MP3 and ADTS readers past the probe.
        for seed in 0..50u64 {
            let mut bytes = noise_bytes(seed, 6000);
            for chunk in bytes.chunks_mut(64) {
                chunk[0] = 0xFF;
                if chunk.len() > 1 {
                    chunk[1] |= 0xF0;
                }
            }
            // Garbage frames may still decode; returning at all is the point.
            let _ = decode(&bytes, None);
        }
    }

    #[test]
    fn panic_message_reads_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("overflow");
        assert_eq!(panic_message(payload.as_ref()), "overflow");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bad frame"));
        assert_eq!(panic_message(payload.as_ref()), "bad frame");
        let payload: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn decode_declared_wma_is_unsupported() {
        let bytes = wav_bytes(&[0; 160], 16000, 1);
        assert!(matches!(
            decode(&bytes, Some(ContainerFormat::Wma)),
            Err(AudioError::UnsupportedCodec(_))
        ));
    }

    #[test]
    fn decode_stereo_wav() {
        let mut interleaved = Vec::new();
        for _ in 0..441 {
            interleaved.push(16384i16);
            interleaved.push(-16384i16);
        }
        let bytes = wav_bytes(&interleaved, 44100, 2);
        let decoded = decode(&bytes, Some(ContainerFormat::Wav)).unwrap();
        assert_eq!(decoded.sample_rate, 44100);
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.frames(), 441);

        let mono = decoded.into_mono();
        assert_eq!(mono.len(), 441);
        assert!(mono.iter().all(|v| v.abs() < 1e-4));
    }

    #[test]
    fn decode_header_only_wav_has_no_samples() {
        let bytes = wav_bytes(&[], 44100, 1);
        assert!(decode(&bytes, None).is_err());
    }
}

//! Canonical uncompressed intermediate.
//!
//! Decoded, down-mixed, resampled audio is re-encoded as a PCM16 mono WAV
//! in memory and then loaded back as floats. The loader only ever sees a
//! single well-formed format regardless of the source codec.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::AudioError;

/// Full scale of a signed 16-bit sample.
const PCM16_SCALE: f32 = 32768.0;

/// Encodes mono f32 samples as a PCM16 WAV file in memory.
///
/// Samples are clipped to the representable range.
pub fn encode_pcm16(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        let mut pcm = writer.get_i16_writer(samples.len() as u32);
        for &s in samples {
            pcm.write_sample(to_pcm16(s));
        }
        pcm.flush()?;
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Loads a WAV file from memory as mono f32 samples in [-1, 1].
///
/// Multi-channel files are averaged; integer and float encodings are both accepted.
pub fn load(wav: &[u8]) -> Result<(Vec<f32>, u32), AudioError> {
    let mut reader = WavReader::new(Cursor::new(wav))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono = crate::decode::downmix_to_mono(&interleaved, spec.channels as usize);
    Ok((mono, spec.sample_rate))
}

fn to_pcm16(s: f32) -> i16 {
    if !s.is_finite() {
        return 0;
    }
    (s * PCM16_SCALE).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_quantization() {
        assert_eq!(to_pcm16(0.0), 0);
        assert_eq!(to_pcm16(0.5), 16384);
        assert_eq!(to_pcm16(-1.0), -32768);
        assert_eq!(to_pcm16(1.0), 32767);
        assert_eq!(to_pcm16(3.0), 32767);
        assert_eq!(to_pcm16(f32::NAN), 0);
    }

    #[test]
    fn encode_then_load_keeps_length_and_rate() {
        let samples: Vec<f32> = (0..1600).map(|i| ((i % 32) as f32 - 16.0) / 32.0).collect();
        let wav = encode_pcm16(&samples, 16000).unwrap();
        assert_eq!(&wav[..4], b"RIFF");
        assert!(wav.len() > samples.len() * 2);

        let (loaded, rate) = load(&wav).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(loaded.len(), samples.len());
        for (a, b) in loaded.iter().zip(&samples) {
            assert!((a - b).abs() <= 1.0 / PCM16_SCALE);
        }
    }

    #[test]
    fn load_rejects_garbage() {
        assert!(matches!(load(b"not a wav file"), Err(AudioError::Wav(_))));
    }
}

//! Encoded bytes to canonical waveform.
//!
//! # Pipeline
//!
//! 1. Demux and decode with [`decode`](crate::decode::decode)
//! 2. Down-mix to mono, resample to the target rate
//! 3. Round-trip through an in-memory PCM16 WAV ([`wav`](crate::wav))
//! 4. Optionally trim leading/trailing silence
//! 5. Truncate (keep the first N samples) or zero-pad to exactly N samples

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::decode::decode;
use crate::error::AudioError;
use crate::format::ContainerFormat;
use crate::resample::resample;
use crate::{silence, wav};

/// Default canonical sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Default canonical duration in seconds.
pub const DEFAULT_DURATION_SECS: f32 = 4.0;

/// Top-dB threshold used when silence trimming is enabled for training data.
pub const TRAINING_TRIM_TOP_DB: f32 = 20.0;

/// Configures the decoder/normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    /// Output sample rate in Hz (default: 16000).
    pub sample_rate: u32,
    /// Output duration in seconds (default: 4.0).
    pub duration_secs: f32,
    /// Trim frames quieter than this many dB below the peak frame before
    /// fixing the length. `None` disables trimming (default).
    pub trim_silence: Option<f32>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_secs: DEFAULT_DURATION_SECS,
            trim_silence: None,
        }
    }
}

impl NormalizeConfig {
    /// Number of samples every normalized waveform has.
    pub fn target_len(&self) -> usize {
        (self.sample_rate as f64 * self.duration_secs as f64).round() as usize
    }

    /// Rejects configurations that cannot produce a waveform.
    pub fn validate(&self) -> Result<(), AudioError> {
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidConfig("sample_rate must be positive".into()));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(AudioError::InvalidConfig(format!(
                "duration_secs must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.target_len() == 0 {
            return Err(AudioError::InvalidConfig("target length rounds to zero samples".into()));
        }
        if let Some(top_db) = self.trim_silence {
            if !top_db.is_finite() || top_db <= 0.0 {
                return Err(AudioError::InvalidConfig(format!(
                    "trim_silence must be a positive dB value, got {top_db}"
                )));
            }
        }
        Ok(())
    }
}

/// Single-channel audio at a fixed sample rate.
///
/// Waveforms returned by [`Normalizer`] always hold exactly
/// [`NormalizeConfig::target_len`] samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wraps already-canonical samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// Turns encoded audio of any supported container into a canonical [`Waveform`].
///
/// Stateless apart from its configuration; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    cfg: NormalizeConfig,
}

impl Normalizer {
    /// Creates a normalizer, validating the configuration.
    pub fn new(cfg: NormalizeConfig) -> Result<Self, AudioError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.cfg
    }

    /// Normalizes a buffer whose container is sniffed from its contents.
    pub fn normalize(&self, bytes: &[u8]) -> Result<Waveform, AudioError> {
        self.normalize_as(bytes, None)
    }

    /// Normalizes a buffer with a declared container format used as a probe hint.
    pub fn normalize_as(
        &self,
        bytes: &[u8],
        declared: Option<ContainerFormat>,
    ) -> Result<Waveform, AudioError> {
        let cfg = &self.cfg;

        let decoded = decode(bytes, declared)?;
        let src_rate = decoded.sample_rate;
        let mono = decoded.into_mono();

        let resampled = resample(&mono, src_rate, cfg.sample_rate)?;
        drop(mono);
        if resampled.is_empty() {
            return Err(AudioError::NoSamples);
        }

        let intermediate = wav::encode_pcm16(&resampled, cfg.sample_rate)?;
        drop(resampled);
        let (mut samples, rate) = wav::load(&intermediate)?;
        drop(intermediate);
        if rate != cfg.sample_rate {
            return Err(AudioError::Decode(format!(
                "intermediate rate {rate} does not match target {}",
                cfg.sample_rate
            )));
        }

        if let Some(top_db) = cfg.trim_silence {
            samples = silence::trim(&samples, top_db);
        }

        let decoded_len = samples.len();
        fix_length(&mut samples, cfg.target_len());

        debug!(
            src_rate,
            decoded_len,
            target_len = samples.len(),
            "normalized waveform"
        );

        Ok(Waveform::new(samples, cfg.sample_rate))
    }

    /// Normalizes a base64-encoded buffer.
    pub fn normalize_base64(&self, encoded: &str) -> Result<Waveform, AudioError> {
        let bytes = decode_base64(encoded)?;
        self.normalize(&bytes)
    }
}

/// Decodes a standard base64 payload, ignoring surrounding whitespace.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, AudioError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    if bytes.is_empty() {
        return Err(AudioError::Empty);
    }
    Ok(bytes)
}

/// Truncates to the first `target_len` samples or right-pads with zeros.
pub fn fix_length(samples: &mut Vec<f32>, target_len: usize) {
    if samples.len() > target_len {
        samples.truncate(target_len);
    } else {
        samples.resize(target_len, 0.0);
    }
}

/// Normalizes with the given configuration.
pub fn normalize(bytes: &[u8], cfg: &NormalizeConfig) -> Result<Waveform, AudioError> {
    Normalizer::new(cfg.clone())?.normalize(bytes)
}

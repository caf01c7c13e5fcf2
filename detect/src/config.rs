use serde::{Deserialize, Serialize};
use voxguard_audio::{NormalizeConfig, DEFAULT_DURATION_SECS, DEFAULT_SAMPLE_RATE};
use voxguard_features::ExtractorConfig;

use crate::error::ConfigError;

/// User-facing pipeline settings.
///
/// One sample rate drives both the normalizer output and the extractor
/// input, so the two stages cannot drift apart. Every field has a default,
/// so an empty document deserializes to [`PipelineConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Canonical sample rate in Hz. Default: 16000.
    pub sample_rate: u32,
    /// Canonical waveform length in seconds. Default: 4.0.
    pub duration_secs: f32,
    /// Silence trimming threshold in dB below the peak; `None` disables
    /// trimming. Default: none.
    pub trim_silence_db: Option<f32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_secs: DEFAULT_DURATION_SECS,
            trim_silence_db: None,
        }
    }
}

impl PipelineConfig {
    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            sample_rate: self.sample_rate,
            duration_secs: self.duration_secs,
            trim_silence: self.trim_silence_db,
        }
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            sample_rate: self.sample_rate,
            ..ExtractorConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.normalize_config().validate()?;
        check_lockstep(&self.normalize_config(), &self.extractor_config())
    }
}

/// The extractor must receive audio at exactly the rate the normalizer produces.
pub fn check_lockstep(
    normalize: &NormalizeConfig,
    extract: &ExtractorConfig,
) -> Result<(), ConfigError> {
    if normalize.sample_rate != extract.sample_rate {
        return Err(ConfigError::SampleRateMismatch {
            normalizer: normalize.sample_rate,
            extractor: extract.sample_rate,
        });
    }
    Ok(())
}

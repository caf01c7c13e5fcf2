use tracing::debug;

use crate::error::FeatureError;
use crate::mfcc::Mfcc;
use crate::pitch::{Pyin, PyinConfig};
use crate::spectral::{rms, spectral_centroid, spectral_rolloff, zero_crossing_rate};
use crate::stats::{column_mean_std, mean};
use crate::stft::Stft;
use crate::vector::{FeatureVector, FEATURE_LEN, N_MFCC};

/// Analysis parameters for [`Extractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Expected input sample rate in Hz. Default: 16000.
    pub sample_rate: u32,
    /// FFT size and analysis frame length. Default: 2048.
    pub n_fft: usize,
    /// Hop between frames in samples. Default: 512.
    pub hop_length: usize,
    /// Mel bands feeding the cepstrum. Default: 128.
    pub n_mels: usize,
    /// Fraction of spectral magnitude under the roll-off point. Default: 0.85.
    pub roll_percent: f64,
    /// Pitch tracker parameters (C2..C7 search range by default).
    pub pitch: PyinConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            roll_percent: 0.85,
            pitch: PyinConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Shortest accepted input: one second of audio.
    pub fn min_samples(&self) -> usize {
        self.sample_rate as usize
    }
}

/// Turns a canonical waveform into a [`FeatureVector`].
///
/// All tables (window, filterbank, DCT basis, pitch transition model) are
/// built once in [`Extractor::new`]; `extract` only reads them, so one
/// extractor can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Extractor {
    cfg: ExtractorConfig,
    stft: Stft,
    freqs: Vec<f64>,
    mfcc: Mfcc,
    pyin: Pyin,
}

impl Extractor {
    pub fn new(cfg: ExtractorConfig) -> Result<Self, FeatureError> {
        if cfg.sample_rate == 0 {
            return Err(FeatureError::InvalidConfig("sample rate must be positive".into()));
        }
        let stft = Stft::new(cfg.n_fft, cfg.hop_length).ok_or_else(|| {
            FeatureError::InvalidConfig(format!(
                "n_fft must be a power of two and hop positive, got {} / {}",
                cfg.n_fft, cfg.hop_length
            ))
        })?;
        if cfg.n_mels < N_MFCC {
            return Err(FeatureError::InvalidConfig(format!(
                "n_mels {} is smaller than the {N_MFCC} cepstral coefficients",
                cfg.n_mels
            )));
        }
        if !(cfg.roll_percent > 0.0 && cfg.roll_percent < 1.0) {
            return Err(FeatureError::InvalidConfig(format!(
                "roll_percent must be in (0, 1), got {}",
                cfg.roll_percent
            )));
        }

        let freqs = stft.bin_frequencies(cfg.sample_rate);
        let mfcc = Mfcc::new(N_MFCC, cfg.n_mels, cfg.n_fft, cfg.sample_rate);
        let pyin = Pyin::new(cfg.pitch.clone(), cfg.sample_rate)?;
        Ok(Self {
            cfg,
            stft,
            freqs,
            mfcc,
            pyin,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.cfg
    }

    /// Computes the 86-element feature vector.
    ///
    /// Fails with [`FeatureError::InsufficientAudio`] below one second of
    /// samples. Silence is valid input and yields zero pitch statistics.
    pub fn extract(&self, samples: &[f32]) -> Result<FeatureVector, FeatureError> {
        let min_samples = self.cfg.min_samples();
        if samples.len() < min_samples {
            return Err(FeatureError::InsufficientAudio {
                min_samples,
                got_samples: samples.len(),
            });
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(FeatureError::NonFiniteInput { index });
        }

        let spec = self.stft.magnitude(samples);
        let cepstrum = self.mfcc.compute(&spec.power());
        let mfcc_stats = column_mean_std(&cepstrum, N_MFCC);

        let centroid = mean(&spectral_centroid(&spec.frames, &self.freqs));
        let rolloff = mean(&spectral_rolloff(&spec.frames, &self.freqs, self.cfg.roll_percent));
        let zcr = mean(&zero_crossing_rate(samples, self.cfg.n_fft, self.cfg.hop_length));
        let energy = mean(&rms(samples, self.cfg.n_fft, self.cfg.hop_length));

        let track = self.pyin.track(samples);
        let (pitch_mean, pitch_std) = track.summary();

        let mut values = Vec::with_capacity(FEATURE_LEN);
        values.extend(mfcc_stats.iter().map(|&(m, _)| m as f32));
        values.extend(mfcc_stats.iter().map(|&(_, s)| s as f32));
        values.extend(
            [centroid, rolloff, zcr, energy, pitch_mean, pitch_std]
                .iter()
                .map(|&v| v as f32),
        );

        debug!(
            samples = samples.len(),
            frames = spec.num_frames(),
            voiced = track.voiced().count(),
            pitch_mean,
            "extracted features"
        );
        FeatureVector::try_from(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn voiced(n: usize, sr: u32) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f64 / sr as f64;
                // f0 wobbles 150 +/- 20 Hz at 3 Hz.
                let phase = 2.0 * PI * 150.0 * t - (20.0 / 3.0) * (2.0 * PI * 3.0 * t).cos();
                (0.4 * phase.sin() + 0.2 * (2.0 * phase).sin() + 0.1 * (3.0 * phase).sin()) as f32
            })
            .collect()
    }

    #[test]
    fn default_config_builds() {
        let ex = Extractor::new(ExtractorConfig::default()).unwrap();
        assert_eq!(ex.config().min_samples(), 16000);
    }

    #[test]
    fn rejects_short_audio() {
        let ex = Extractor::new(ExtractorConfig::default()).unwrap();
        match ex.extract(&vec![0.1; 15999]) {
            Err(FeatureError::InsufficientAudio {
                min_samples,
                got_samples,
            }) => {
                assert_eq!(min_samples, 16000);
                assert_eq!(got_samples, 15999);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_non_finite_input() {
        let ex = Extractor::new(ExtractorConfig::default()).unwrap();
        let mut samples = vec![0.0; 16000];
        samples[7] = f32::INFINITY;
        assert!(matches!(
            ex.extract(&samples),
            Err(FeatureError::NonFiniteInput { index: 7 })
        ));
    }

    #[test]
    fn silence_has_zero_pitch() {
        let ex = Extractor::new(ExtractorConfig::default()).unwrap();
        let v = ex.extract(&vec![0.0; 16000]).unwrap();
        assert_eq!(v.len(), FEATURE_LEN);
        assert_eq!(v.pitch_mean(), 0.0);
        assert_eq!(v.pitch_std(), 0.0);
        assert_eq!(v.rms(), 0.0);
        assert_eq!(v.zero_crossing_rate(), 0.0);
        assert_eq!(v.spectral_centroid(), 0.0);
        // Flat -100 dB log-mel spectrum.
        assert!((v.mfcc_means()[0] + 100.0 * 128f32.sqrt()).abs() < 1e-2);
        assert!(v.mfcc_stds().iter().all(|&s| s.abs() < 1e-3));
    }

    #[test]
    fn voiced_signal_features() {
        let ex = Extractor::new(ExtractorConfig::default()).unwrap();
        let v = ex.extract(&voiced(64000, 16000)).unwrap();
        assert!(v.as_slice().iter().all(|x| x.is_finite()));
        assert!(v.mfcc_means().iter().any(|&m| m != 0.0));
        assert!(v.mfcc_stds().iter().any(|&s| s != 0.0));
        assert!(v.rms() > 0.1);
        assert!(v.spectral_centroid() > 100.0 && v.spectral_centroid() < 1000.0);
        assert!(v.spectral_rolloff() >= v.spectral_centroid());
        assert!(v.pitch_mean() > 120.0 && v.pitch_mean() < 180.0, "pitch {}", v.pitch_mean());
        assert!(v.pitch_std() > 0.0);
    }

    #[test]
    fn deterministic() {
        let ex = Extractor::new(ExtractorConfig::default()).unwrap();
        let samples = voiced(20000, 16000);
        assert_eq!(ex.extract(&samples).unwrap(), ex.extract(&samples).unwrap());
    }

    #[test]
    fn rejects_bad_config() {
        let cfg = ExtractorConfig {
            n_fft: 2000,
            ..ExtractorConfig::default()
        };
        assert!(matches!(Extractor::new(cfg), Err(FeatureError::InvalidConfig(_))));

        let cfg = ExtractorConfig {
            n_mels: 20,
            ..ExtractorConfig::default()
        };
        assert!(matches!(Extractor::new(cfg), Err(FeatureError::InvalidConfig(_))));
    }
}

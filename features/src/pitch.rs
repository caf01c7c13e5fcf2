//! Probabilistic YIN fundamental frequency tracking.
//!
//! Each frame's cumulative-mean-normalized difference function is scanned
//! for troughs under a Beta(2, 18) distribution of thresholds. Trough
//! probabilities become observations over a grid of pitch bins (plus one
//! unvoiced twin per bin), and a Viterbi pass over a banded transition
//! model picks the most likely pitch/voicing path.

use tracing::trace;

use crate::error::FeatureError;
use crate::stft::{centered_frame, num_frames, PadMode};

/// C2, the lowest candidate pitch in Hz.
pub const DEFAULT_FMIN: f64 = 65.406_391_325_149_66;

/// C7, the highest candidate pitch in Hz.
pub const DEFAULT_FMAX: f64 = 2_093.004_522_404_789;

/// Pitch tracker parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PyinConfig {
    /// Minimum frequency in Hz. Default: C2 (~65.4 Hz).
    pub fmin: f64,
    /// Maximum frequency in Hz. Default: C7 (~2093 Hz).
    pub fmax: f64,
    /// Analysis frame length in samples. Default: 2048.
    pub frame_length: usize,
    /// Difference-function integration window. Default: frame_length / 2.
    pub win_length: usize,
    /// Hop between frames in samples. Default: 512.
    pub hop_length: usize,
    /// Number of thresholds the Beta prior is sampled at. Default: 100.
    pub n_thresholds: usize,
    /// Beta prior shape parameters. Default: (2, 18).
    pub beta_parameters: (u32, u32),
    /// Boltzmann parameter favouring earlier troughs. Default: 2.0.
    pub boltzmann_parameter: f64,
    /// Pitch bin width in semitones. Default: 0.1.
    pub resolution: f64,
    /// Maximum pitch change in octaves per second. Default: 35.92.
    pub max_transition_rate: f64,
    /// Probability of switching between voiced and unvoiced per frame. Default: 0.01.
    pub switch_prob: f64,
    /// Mass given to the global minimum when no trough is under threshold. Default: 0.01.
    pub no_trough_prob: f64,
}

impl Default for PyinConfig {
    fn default() -> Self {
        Self {
            fmin: DEFAULT_FMIN,
            fmax: DEFAULT_FMAX,
            frame_length: 2048,
            win_length: 1024,
            hop_length: 512,
            n_thresholds: 100,
            beta_parameters: (2, 18),
            boltzmann_parameter: 2.0,
            resolution: 0.1,
            max_transition_rate: 35.92,
            switch_prob: 0.01,
            no_trough_prob: 0.01,
        }
    }
}

/// Per-frame tracking result.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTrack {
    /// Fundamental frequency per frame, `None` when unvoiced.
    pub f0: Vec<Option<f64>>,
    /// Total voiced observation mass per frame, in [0, 1].
    pub voiced_prob: Vec<f64>,
}

impl PitchTrack {
    pub fn voiced(&self) -> impl Iterator<Item = f64> + '_ {
        self.f0.iter().flatten().copied()
    }

    /// Mean and population standard deviation of voiced frames; `(0, 0)` if none.
    pub fn summary(&self) -> (f64, f64) {
        let voiced: Vec<f64> = self.voiced().collect();
        if voiced.is_empty() {
            return (0.0, 0.0);
        }
        crate::stats::mean_std(&voiced)
    }
}

/// Precomputed pYIN tracker for one sample rate.
#[derive(Debug, Clone)]
pub struct Pyin {
    cfg: PyinConfig,
    sample_rate: f64,
    min_period: usize,
    max_period: usize,
    beta_probs: Vec<f64>,
    bins_per_octave: f64,
    n_bins: usize,
    bin_freqs: Vec<f64>,
    /// Half-width of the pitch transition band, in bins.
    band: usize,
    /// `ln` of the unnormalized triangular weight at each distance `0..=band`.
    log_tri: Vec<f64>,
    /// `ln` of each source bin's row normalizer.
    log_row_norm: Vec<f64>,
    log_stay: f64,
    log_switch: f64,
}

impl Pyin {
    pub fn new(cfg: PyinConfig, sample_rate: u32) -> Result<Self, FeatureError> {
        validate(&cfg, sample_rate)?;
        let sr = sample_rate as f64;

        let min_period = ((sr / cfg.fmax).floor() as usize).max(1);
        let max_period =
            ((sr / cfg.fmin).ceil() as usize).min(cfg.frame_length - cfg.win_length - 1);
        if min_period >= max_period {
            return Err(FeatureError::InvalidConfig(format!(
                "empty period range {min_period}..{max_period}: frame too short for fmin"
            )));
        }

        let beta_probs = beta_probabilities(cfg.n_thresholds, cfg.beta_parameters);

        let bins_per_semitone = (1.0 / cfg.resolution - 1e-9).ceil();
        let bins_per_octave = 12.0 * bins_per_semitone;
        let n_bins = (bins_per_octave * (cfg.fmax / cfg.fmin).log2() + 1e-9).floor() as usize + 1;
        let bin_freqs = (0..n_bins)
            .map(|b| cfg.fmin * 2f64.powf(b as f64 / bins_per_octave))
            .collect();

        let max_semitones =
            (cfg.max_transition_rate * 12.0 * cfg.hop_length as f64 / sr).round();
        let width = (max_semitones * bins_per_semitone) as usize + 1;
        let band = width / 2;
        let tri: Vec<f64> = (0..=band)
            .map(|d| 1.0 - 2.0 * d as f64 / (width + 1) as f64)
            .collect();
        let log_row_norm = (0..n_bins)
            .map(|b| {
                let lo = b.saturating_sub(band);
                let hi = (b + band).min(n_bins - 1);
                (lo..=hi).map(|j| tri[b.abs_diff(j)]).sum::<f64>().ln()
            })
            .collect();
        let log_tri = tri.iter().map(|w| w.ln()).collect();

        let log_stay = (1.0 - cfg.switch_prob).ln();
        let log_switch = cfg.switch_prob.ln();

        Ok(Self {
            cfg,
            sample_rate: sr,
            min_period,
            max_period,
            beta_probs,
            bins_per_octave,
            n_bins,
            bin_freqs,
            band,
            log_tri,
            log_row_norm,
            log_stay,
            log_switch,
        })
    }

    pub fn config(&self) -> &PyinConfig {
        &self.cfg
    }

    pub fn num_pitch_bins(&self) -> usize {
        self.n_bins
    }

    pub fn period_range(&self) -> (usize, usize) {
        (self.min_period, self.max_period)
    }

    /// Tracks f0 across centered frames of `samples`.
    pub fn track(&self, samples: &[f32]) -> PitchTrack {
        let n_frames = num_frames(samples.len(), self.cfg.hop_length);
        let mut frame = vec![0.0f64; self.cfg.frame_length];
        let mut observations = Vec::with_capacity(n_frames);
        let mut voiced_prob = Vec::with_capacity(n_frames);

        for t in 0..n_frames {
            centered_frame(samples, t, self.cfg.hop_length, PadMode::Constant, &mut frame);
            let (obs, voiced) = self.observe(&frame);
            observations.push(obs);
            voiced_prob.push(voiced);
        }

        let states = self.viterbi(&observations);
        let f0: Vec<Option<f64>> = states
            .iter()
            .map(|&s| (s < self.n_bins).then(|| self.bin_freqs[s]))
            .collect();

        trace!(
            frames = n_frames,
            voiced = f0.iter().filter(|f| f.is_some()).count(),
            "pitch tracked"
        );
        PitchTrack { f0, voiced_prob }
    }

    /// Observation probabilities `[2 * n_bins]` (voiced bins, then unvoiced) for one frame.
    fn observe(&self, frame: &[f64]) -> (Vec<f64>, f64) {
        let yin = self.cumulative_mean_normalized_difference(frame);
        let shifts = parabolic_shifts(&yin);
        let troughs = local_minima(&yin);

        let mut obs = vec![0.0f64; 2 * self.n_bins];
        if !troughs.is_empty() {
            let heights: Vec<f64> = troughs.iter().map(|&k| yin[k]).collect();
            let probs = self.trough_probabilities(&heights);
            for (&k, &p) in troughs.iter().zip(&probs) {
                if p == 0.0 {
                    continue;
                }
                let period = (self.min_period + k) as f64 + shifts[k];
                let f0 = self.sample_rate / period;
                let bin = (self.bins_per_octave * (f0 / self.cfg.fmin).log2()).round();
                let bin = bin.clamp(0.0, self.n_bins as f64) as usize;
                // Candidates above fmax fall off the top of the grid.
                if bin < self.n_bins {
                    obs[bin] = p;
                }
            }
        }

        let voiced: f64 = obs[..self.n_bins].iter().sum::<f64>().clamp(0.0, 1.0);
        let unvoiced = (1.0 - voiced) / self.n_bins as f64;
        obs[self.n_bins..].fill(unvoiced);
        (obs, voiced)
    }

    /// `d'(tau)` for `tau` in `min_period..=max_period`.
    fn cumulative_mean_normalized_difference(&self, frame: &[f64]) -> Vec<f64> {
        let w = self.cfg.win_length;
        let max_p = self.max_period;

        // d(tau) = E(0) + E(tau) - 2 r(tau), with E the windowed energy and r the autocorrelation.
        let energy_at = |tau: usize| -> f64 { frame[tau..tau + w].iter().map(|x| x * x).sum() };
        let e0 = energy_at(0);
        let mut diff = vec![0.0f64; max_p + 1];
        for (tau, d) in diff.iter_mut().enumerate().skip(1) {
            let r: f64 = frame[..w].iter().zip(&frame[tau..tau + w]).map(|(a, b)| a * b).sum();
            let v = e0 + energy_at(tau) - 2.0 * r;
            // Cancellation can leave tiny negatives on near-silent frames.
            *d = v.max(0.0);
        }

        let mut cumulative = 0.0;
        let mut mean = vec![0.0f64; max_p + 1];
        for tau in 1..=max_p {
            cumulative += diff[tau];
            mean[tau] = cumulative / tau as f64;
        }

        (self.min_period..=max_p)
            .map(|tau| diff[tau] / (mean[tau] + f64::MIN_POSITIVE))
            .collect()
    }

    /// Probability that each trough is the true period, marginalized over thresholds.
    fn trough_probabilities(&self, heights: &[f64]) -> Vec<f64> {
        let n = self.cfg.n_thresholds;
        let lambda = self.cfg.boltzmann_parameter;
        let mut probs = vec![0.0f64; heights.len()];

        for (j, &beta) in self.beta_probs.iter().enumerate() {
            let threshold = (j + 1) as f64 / n as f64;
            let below = heights.iter().filter(|&&h| h < threshold).count();
            if below == 0 {
                continue;
            }
            let mut position = 0usize;
            for (i, &h) in heights.iter().enumerate() {
                if h < threshold {
                    probs[i] += boltzmann_pmf(position, lambda, below) * beta;
                    position += 1;
                }
            }
        }

        let global_min = heights
            .iter()
            .enumerate()
            .fold(0, |best, (i, &h)| if h < heights[best] { i } else { best });
        let min_height = heights[global_min];
        let no_trough_mass: f64 = self
            .beta_probs
            .iter()
            .enumerate()
            .filter(|(j, _)| min_height >= (j + 1) as f64 / n as f64)
            .map(|(_, p)| p)
            .sum();
        probs[global_min] += self.cfg.no_trough_prob * no_trough_mass;
        probs
    }

    /// Most likely state sequence. States `0..n` are voiced pitch bins and
    /// `n..2n` their unvoiced twins. Ties resolve to the lowest state.
    fn viterbi(&self, observations: &[Vec<f64>]) -> Vec<usize> {
        let n = self.n_bins;
        let n_states = 2 * n;
        let log = |p: f64| (p + f64::MIN_POSITIVE).ln();

        let Some(first) = observations.first() else {
            return Vec::new();
        };

        let log_init_unvoiced = log(1.0 / n as f64);
        let mut value: Vec<f64> = (0..n_states)
            .map(|s| {
                let init = if s < n { log(0.0) } else { log_init_unvoiced };
                log(first[s]) + init
            })
            .collect();
        let mut next = vec![0.0f64; n_states];
        let mut pointers: Vec<Vec<u32>> = Vec::with_capacity(observations.len());
        pointers.push(vec![0; n_states]);

        for obs in &observations[1..] {
            let mut ptr = vec![0u32; n_states];
            for to in 0..n_states {
                let (to_voiced, to_bin) = (to < n, to % n);
                let lo = to_bin.saturating_sub(self.band);
                let hi = (to_bin + self.band).min(n - 1);

                let mut best = f64::NEG_INFINITY;
                let mut best_from = 0usize;
                // Voiced sources precede unvoiced ones, so strict `>` keeps the lowest index on ties.
                for from_voiced in [true, false] {
                    let log_switch = if from_voiced == to_voiced {
                        self.log_stay
                    } else {
                        self.log_switch
                    };
                    let offset = if from_voiced { 0 } else { n };
                    for from_bin in lo..=hi {
                        let score = value[offset + from_bin]
                            + log_switch
                            + self.log_tri[from_bin.abs_diff(to_bin)]
                            - self.log_row_norm[from_bin];
                        if score > best {
                            best = score;
                            best_from = offset + from_bin;
                        }
                    }
                }
                next[to] = log(obs[to]) + best;
                ptr[to] = best_from as u32;
            }
            std::mem::swap(&mut value, &mut next);
            pointers.push(ptr);
        }

        let mut state = value
            .iter()
            .enumerate()
            .fold(0, |best, (s, &v)| if v > value[best] { s } else { best });
        let mut path = vec![0usize; observations.len()];
        for t in (0..observations.len()).rev() {
            path[t] = state;
            state = pointers[t][state] as usize;
        }
        path
    }
}

fn validate(cfg: &PyinConfig, sample_rate: u32) -> Result<(), FeatureError> {
    let bad = |msg: String| Err(FeatureError::InvalidConfig(msg));
    if sample_rate == 0 {
        return bad("sample rate must be positive".into());
    }
    if !(cfg.fmin > 0.0 && cfg.fmin < cfg.fmax) {
        return bad(format!("need 0 < fmin < fmax, got {} and {}", cfg.fmin, cfg.fmax));
    }
    if cfg.win_length == 0 || cfg.win_length + 1 >= cfg.frame_length {
        return bad(format!(
            "win_length {} must be in 1..{}",
            cfg.win_length,
            cfg.frame_length.saturating_sub(1)
        ));
    }
    if cfg.hop_length == 0 {
        return bad("hop_length must be positive".into());
    }
    if cfg.n_thresholds == 0 {
        return bad("n_thresholds must be positive".into());
    }
    if cfg.beta_parameters.0 == 0 || cfg.beta_parameters.1 == 0 {
        return bad("beta parameters must be positive".into());
    }
    if !(cfg.resolution > 0.0 && cfg.resolution <= 1.0) {
        return bad(format!("resolution must be in (0, 1], got {}", cfg.resolution));
    }
    if !(cfg.switch_prob > 0.0 && cfg.switch_prob < 1.0) {
        return bad(format!("switch_prob must be in (0, 1), got {}", cfg.switch_prob));
    }
    if !(cfg.boltzmann_parameter > 0.0) {
        return bad("boltzmann_parameter must be positive".into());
    }
    Ok(())
}

/// Probability mass of Beta(a, b) between consecutive thresholds `j/n`.
fn beta_probabilities(n: usize, (a, b): (u32, u32)) -> Vec<f64> {
    let cdf: Vec<f64> = (0..=n).map(|j| beta_cdf(j as f64 / n as f64, a, b)).collect();
    cdf.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Regularized incomplete beta for integer shapes:
/// `I_x(a, b) = sum_{j=a}^{a+b-1} C(a+b-1, j) x^j (1-x)^(a+b-1-j)`.
fn beta_cdf(x: f64, a: u32, b: u32) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let m = a + b - 1;
    (a..=m)
        .map(|j| binomial(m, j) * x.powi(j as i32) * (1.0 - x).powi((m - j) as i32))
        .sum()
}

fn binomial(n: u32, k: u32) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Truncated geometric pmf over `0..count`.
fn boltzmann_pmf(k: usize, lambda: f64, count: usize) -> f64 {
    (1.0 - (-lambda).exp()) * (-lambda * k as f64).exp() / (1.0 - (-lambda * count as f64).exp())
}

/// Sub-sample offset of each point's parabolic vertex; 0 at the ends and
/// where the vertex falls outside the neighbouring samples.
fn parabolic_shifts(x: &[f64]) -> Vec<f64> {
    let mut shifts = vec![0.0f64; x.len()];
    for i in 1..x.len().saturating_sub(1) {
        let a = x[i + 1] - 2.0 * x[i] + x[i - 1];
        let b = (x[i + 1] - x[i - 1]) / 2.0;
        if b.abs() < a.abs() {
            shifts[i] = -b / a;
        }
    }
    shifts
}

/// Indices of local minima: strictly below the left neighbour and not above the right.
/// The first point counts when it is below the second; the last compares against itself on the right.
fn local_minima(x: &[f64]) -> Vec<usize> {
    let n = x.len();
    (0..n)
        .filter(|&i| {
            if i == 0 {
                n > 1 && x[0] < x[1]
            } else {
                x[i] < x[i - 1] && (i + 1 == n || x[i] <= x[i + 1])
            }
        })
        .collect()
}

//! Mel-frequency cepstral coefficients.
//!
//! power spectrogram -> mel filterbank -> dB (clamped to 80 dB below the
//! global peak) -> orthonormal DCT-II, keeping the first `n_mfcc` terms.

use std::f64::consts::PI;

use crate::mel::mel_filter_bank;

/// Smallest power considered when converting to decibels.
pub const AMIN: f64 = 1e-10;

/// Dynamic range kept below the loudest cell, in dB.
pub const TOP_DB: f64 = 80.0;

/// Converts a power matrix to dB in place (reference power 1.0).
///
/// Values are floored at [`AMIN`], then every cell more than `top_db` below
/// the matrix maximum is raised to that level.
pub fn power_to_db(matrix: &mut [Vec<f64>], top_db: f64) {
    let mut peak = f64::NEG_INFINITY;
    for row in matrix.iter_mut() {
        for v in row.iter_mut() {
            *v = 10.0 * v.max(AMIN).log10();
            peak = peak.max(*v);
        }
    }
    let floor = peak - top_db;
    for row in matrix.iter_mut() {
        for v in row.iter_mut() {
            *v = v.max(floor);
        }
    }
}

/// Orthonormal DCT-II basis, `[n_out][n_in]`.
pub fn dct_basis(n_out: usize, n_in: usize) -> Vec<Vec<f64>> {
    let n = n_in as f64;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..n_in)
                .map(|i| scale * (PI * k as f64 * (2 * i + 1) as f64 / (2.0 * n)).cos())
                .collect()
        })
        .collect()
}

/// Precomputed MFCC transform for one sample rate and FFT size.
#[derive(Debug, Clone)]
pub struct Mfcc {
    mel_bank: Vec<Vec<f64>>,
    dct: Vec<Vec<f64>>,
}

impl Mfcc {
    pub fn new(n_mfcc: usize, n_mels: usize, n_fft: usize, sample_rate: u32) -> Self {
        let fmax = sample_rate as f64 / 2.0;
        Self {
            mel_bank: mel_filter_bank(n_mels, n_fft, sample_rate, 0.0, fmax),
            dct: dct_basis(n_mfcc, n_mels),
        }
    }

    pub fn n_mfcc(&self) -> usize {
        self.dct.len()
    }

    /// Mel power spectrogram `[frame][mel]` from a power spectrogram `[frame][bin]`.
    pub fn mel_spectrogram(&self, power: &[Vec<f64>]) -> Vec<Vec<f64>> {
        power
            .iter()
            .map(|frame| {
                self.mel_bank
                    .iter()
                    .map(|filter| filter.iter().zip(frame).map(|(w, p)| w * p).sum())
                    .collect()
            })
            .collect()
    }

    /// Coefficients `[frame][n_mfcc]` from a power spectrogram.
    pub fn compute(&self, power: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut log_mel = self.mel_spectrogram(power);
        power_to_db(&mut log_mel, TOP_DB);
        log_mel
            .iter()
            .map(|frame| {
                self.dct
                    .iter()
                    .map(|basis| basis.iter().zip(frame).map(|(b, x)| b * x).sum())
                    .collect()
            })
            .collect()
    }
}

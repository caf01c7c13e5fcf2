//! Centered short-time framing and magnitude spectrogram.
//!
//! Frame `t` is centered on sample `t * hop`: the signal is padded by half a
//! frame on each side, so `n` samples always give `1 + n / hop` frames.

use std::f64::consts::PI;

use crate::fft::RealFft;

/// How samples outside the signal are filled when a frame overhangs an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Zeros.
    Constant,
    /// Repeat the first/last sample.
    Edge,
}

/// Number of centered frames for `len` samples.
pub fn num_frames(len: usize, hop: usize) -> usize {
    1 + len / hop
}

/// Copies centered frame `t` into `out` (whose length is the frame length).
pub fn centered_frame(samples: &[f32], t: usize, hop: usize, pad: PadMode, out: &mut [f64]) {
    let half = (out.len() / 2) as isize;
    let start = (t * hop) as isize - half;
    let len = samples.len() as isize;
    for (j, slot) in out.iter_mut().enumerate() {
        let i = start + j as isize;
        *slot = if (0..len).contains(&i) {
            samples[i as usize] as f64
        } else {
            match pad {
                PadMode::Constant => 0.0,
                PadMode::Edge if len == 0 => 0.0,
                PadMode::Edge => samples[i.clamp(0, len - 1) as usize] as f64,
            }
        };
    }
}

/// Periodic Hann window (`0.5 - 0.5 cos(2 pi n / N)`), the spectral-analysis variant.
pub fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Magnitude spectrogram as `[frame][bin]`.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    pub frames: Vec<Vec<f64>>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Squared magnitudes, same shape.
    pub fn power(&self) -> Vec<Vec<f64>> {
        self.frames
            .iter()
            .map(|f| f.iter().map(|m| m * m).collect())
            .collect()
    }
}

/// Windowed STFT over zero-padded centered frames.
#[derive(Debug, Clone)]
pub struct Stft {
    hop: usize,
    window: Vec<f64>,
    fft: RealFft,
}

impl Stft {
    /// Returns `None` unless `n_fft` is a power of two and `hop > 0`.
    pub fn new(n_fft: usize, hop: usize) -> Option<Self> {
        if hop == 0 {
            return None;
        }
        let fft = RealFft::new(n_fft)?;
        Some(Self {
            hop,
            window: hann_window(n_fft),
            fft,
        })
    }

    pub fn n_fft(&self) -> usize {
        self.fft.len()
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn num_bins(&self) -> usize {
        self.fft.num_bins()
    }

    /// Center frequency of every bin for the given sample rate.
    pub fn bin_frequencies(&self, sample_rate: u32) -> Vec<f64> {
        let n = self.fft.len() as f64;
        (0..self.num_bins())
            .map(|k| k as f64 * sample_rate as f64 / n)
            .collect()
    }

    pub fn magnitude(&self, samples: &[f32]) -> Spectrogram {
        let n_fft = self.fft.len();
        let count = num_frames(samples.len(), self.hop);

        let mut frame = vec![0.0f64; n_fft];
        let mut re = vec![0.0f64; n_fft];
        let mut im = vec![0.0f64; n_fft];
        let mut frames = Vec::with_capacity(count);

        for t in 0..count {
            centered_frame(samples, t, self.hop, PadMode::Constant, &mut frame);
            for (x, w) in frame.iter_mut().zip(&self.window) {
                *x *= w;
            }
            let mut mags = vec![0.0f64; self.num_bins()];
            self.fft.magnitude(&frame, &mut re, &mut im, &mut mags);
            frames.push(mags);
        }

        Spectrogram { frames }
    }
}

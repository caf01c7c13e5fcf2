//! Per-frame spectral shape and time-domain energy descriptors.

use crate::stft::{centered_frame, num_frames, PadMode};

/// Amplitudes at or below this are treated as exact zeros when counting crossings.
const ZERO_THRESHOLD: f64 = 1e-10;

/// Magnitude-weighted mean frequency of each frame. Silent frames give 0.
pub fn spectral_centroid(mags: &[Vec<f64>], freqs: &[f64]) -> Vec<f64> {
    mags.iter()
        .map(|frame| {
            let total: f64 = frame.iter().sum();
            if total <= f64::MIN_POSITIVE {
                return 0.0;
            }
            frame.iter().zip(freqs).map(|(m, f)| m * f).sum::<f64>() / total
        })
        .collect()
}

/// Lowest bin frequency below which `roll_percent` of the frame's magnitude lies.
///
/// A silent frame has a zero threshold, which the first bin already meets.
pub fn spectral_rolloff(mags: &[Vec<f64>], freqs: &[f64], roll_percent: f64) -> Vec<f64> {
    mags.iter()
        .map(|frame| {
            let total: f64 = frame.iter().sum();
            let threshold = roll_percent * total;
            let mut cumulative = 0.0;
            for (m, &f) in frame.iter().zip(freqs) {
                cumulative += m;
                if cumulative >= threshold {
                    return f;
                }
            }
            freqs.last().copied().unwrap_or(0.0)
        })
        .collect()
}

/// Fraction of adjacent sample pairs whose sign differs, per centered frame.
///
/// Frames past the signal edges repeat the edge sample. Near-zero samples
/// count as positive.
pub fn zero_crossing_rate(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f64> {
    let mut frame = vec![0.0f64; frame_length];
    (0..num_frames(samples.len(), hop))
        .map(|t| {
            centered_frame(samples, t, hop, PadMode::Edge, &mut frame);
            let crossings = frame
                .windows(2)
                .filter(|w| is_negative(w[0]) != is_negative(w[1]))
                .count();
            crossings as f64 / frame_length as f64
        })
        .collect()
}

fn is_negative(x: f64) -> bool {
    x.abs() > ZERO_THRESHOLD && x < 0.0
}

/// Root-mean-square amplitude per zero-padded centered frame.
pub fn rms(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f64> {
    let mut frame = vec![0.0f64; frame_length];
    (0..num_frames(samples.len(), hop))
        .map(|t| {
            centered_frame(samples, t, hop, PadMode::Constant, &mut frame);
            let power: f64 = frame.iter().map(|x| x * x).sum::<f64>() / frame_length as f64;
            power.sqrt()
        })
        .collect()
}

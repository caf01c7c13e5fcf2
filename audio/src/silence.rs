//! Leading/trailing silence trimming.
//!
//! Frames are scored by RMS energy in dB relative to the loudest frame.
//! Everything before the first and after the last frame above
//! `-top_db` is discarded.

use tracing::debug;

/// Analysis frame length in samples.
pub const FRAME_LENGTH: usize = 2048;

/// Hop between analysis frames in samples.
pub const HOP_LENGTH: usize = 512;

/// Floor applied to frame power before taking the log.
const POWER_FLOOR: f64 = 1e-10;

/// Returns the `[start, end)` sample range that survives trimming.
///
/// A buffer where every frame is equally quiet (including all-zero audio)
/// is kept whole, since no frame is below the loudest one.
pub fn trim_range(samples: &[f32], top_db: f32) -> (usize, usize) {
    if samples.is_empty() {
        return (0, 0);
    }

    let power = frame_power(samples);
    let max_power = power.iter().cloned().fold(0.0f64, f64::max);
    let ref_db = 10.0 * max_power.max(POWER_FLOOR).log10();
    let threshold = -(top_db as f64);

    let loud = |p: &f64| 10.0 * p.max(POWER_FLOOR).log10() - ref_db > threshold;

    let first = power.iter().position(loud);
    let last = power.iter().rposition(loud);
    match (first, last) {
        (Some(first), Some(last)) => {
            let start = first * HOP_LENGTH;
            let end = ((last + 1) * HOP_LENGTH).min(samples.len());
            (start.min(end), end)
        }
        _ => (0, 0),
    }
}

/// Trims leading and trailing frames quieter than `top_db` below the peak frame.
pub fn trim(samples: &[f32], top_db: f32) -> Vec<f32> {
    let (start, end) = trim_range(samples, top_db);
    debug!(start, end, total = samples.len(), top_db, "trimmed silence");
    samples[start..end].to_vec()
}

/// Mean squared amplitude per centered frame (zero-padded by half a frame on each side).
fn frame_power(samples: &[f32]) -> Vec<f64> {
    let pad = FRAME_LENGTH / 2;
    let num_frames = 1 + samples.len() / HOP_LENGTH;
    let sample_at = |i: isize| -> f64 {
        if i < 0 || i as usize >= samples.len() {
            0.0
        } else {
            samples[i as usize] as f64
        }
    };

    (0..num_frames)
        .map(|f| {
            let start = (f * HOP_LENGTH) as isize - pad as isize;
            let sum: f64 = (0..FRAME_LENGTH as isize)
                .map(|j| {
                    let s = sample_at(start + j);
                    s * s
                })
                .sum();
            sum / FRAME_LENGTH as f64
        })
        .collect()
}

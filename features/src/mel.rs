//! Slaney mel scale and area-normalized triangular filterbank.

/// Linear region slope: 200/3 Hz per mel below 1 kHz.
const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Converts Hz to Slaney mels (linear below 1 kHz, logarithmic above).
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Converts Slaney mels back to Hz.
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// `n + 2` band edges equally spaced on the mel scale between `fmin` and `fmax`, in Hz.
fn mel_frequencies(n: usize, fmin: f64, fmax: f64) -> Vec<f64> {
    let lo = hz_to_mel(fmin);
    let hi = hz_to_mel(fmax);
    let last = (n + 1) as f64;
    (0..n + 2)
        .map(|i| mel_to_hz(lo + (hi - lo) * i as f64 / last))
        .collect()
}

/// Creates the mel filterbank matrix `[num_mels][n_fft / 2 + 1]`.
///
/// Triangles are evaluated at the exact bin frequencies and scaled by
/// `2 / (upper - lower)` so each filter has unit area.
pub fn mel_filter_bank(
    num_mels: usize,
    n_fft: usize,
    sample_rate: u32,
    fmin: f64,
    fmax: f64,
) -> Vec<Vec<f64>> {
    let bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..bins)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();
    let edges = mel_frequencies(num_mels, fmin, fmax);

    (0..num_mels)
        .map(|m| {
            let (lower, center, upper) = (edges[m], edges[m + 1], edges[m + 2]);
            let enorm = 2.0 / (upper - lower);
            fft_freqs
                .iter()
                .map(|&f| {
                    let rising = (f - lower) / (center - lower);
                    let falling = (upper - f) / (upper - center);
                    rising.min(falling).max(0.0) * enorm
                })
                .collect()
        })
        .collect()
}

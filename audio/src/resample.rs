//! Sample rate conversion using rubato.
//!
//! Whole-buffer conversion for mono f32 audio. The FFT resampler is fed
//! fixed-size chunks; the tail is zero-padded and the resampler's delay is
//! removed so output sample 0 lines up with input sample 0.

use rubato::{FftFixedInOut, Resampler};
use tracing::debug;

use crate::error::AudioError;

/// Frames per processing block handed to rubato.
const CHUNK_FRAMES: usize = 1024;

/// Number of output samples produced for `input_len` samples at `src_rate`.
///
/// Rounds up, so a partial trailing input period still yields a sample.
pub fn output_len(input_len: usize, src_rate: u32, dst_rate: u32) -> usize {
    if src_rate == 0 {
        return 0;
    }
    (input_len as u64 * dst_rate as u64).div_ceil(src_rate as u64) as usize
}

/// Converts mono samples from `src_rate` to `dst_rate`.
///
/// Returns the input unchanged when the rates match.
pub fn resample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Result<Vec<f32>, AudioError> {
    if src_rate == 0 || dst_rate == 0 {
        return Err(AudioError::InvalidConfig(format!(
            "sample rates must be positive, got {src_rate} -> {dst_rate}"
        )));
    }
    if src_rate == dst_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler =
        FftFixedInOut::<f32>::new(src_rate as usize, dst_rate as usize, CHUNK_FRAMES, 1)?;
    let chunk = resampler.input_frames_next();
    let delay = resampler.output_delay();
    let expected = output_len(samples.len(), src_rate, dst_rate);

    debug!(
        src_rate,
        dst_rate,
        input = samples.len(),
        expected,
        chunk,
        delay,
        "resampling"
    );

    let mut output = Vec::with_capacity(expected + delay + resampler.output_frames_max());
    let mut input = vec![vec![0.0f32; chunk]];
    let mut pos = 0;

    while output.len() < expected + delay {
        // Zero-pad past the end of the input, which also flushes the delay line.
        for (i, slot) in input[0].iter_mut().enumerate() {
            *slot = samples.get(pos + i).copied().unwrap_or(0.0);
        }
        let resampled = resampler.process(&input, None)?;
        match resampled.first() {
            Some(ch) if !ch.is_empty() => output.extend_from_slice(ch),
            _ => return Err(AudioError::Resample("resampler produced no output".into())),
        }
        pos += chunk;
    }

    output.drain(..delay);
    output.truncate(expected);
    Ok(output)
}

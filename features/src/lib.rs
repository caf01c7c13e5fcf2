//! Fixed-length acoustic feature vectors for speech classification.
//!
//! [`Extractor::extract`] reduces a canonical 16 kHz mono waveform to an
//! 86-element [`FeatureVector`]: MFCC means and standard deviations, mean
//! spectral centroid and roll-off, mean zero-crossing rate and RMS energy,
//! and the mean and standard deviation of a pYIN pitch contour.
//!
//! Building blocks are public for reuse and testing:
//!
//! - `stft`: centered framing, periodic Hann window, magnitude spectrogram
//! - `mel` / `mfcc`: Slaney mel filterbank, dB conversion, orthonormal DCT
//! - `spectral`: centroid, roll-off, zero-crossing rate, RMS
//! - `pitch`: probabilistic YIN with Viterbi decoding

mod error;
mod extractor;
mod fft;
pub mod mel;
pub mod mfcc;
pub mod pitch;
pub mod spectral;
mod stats;
pub mod stft;
pub mod vector;

pub use error::FeatureError;
pub use extractor::{Extractor, ExtractorConfig};
pub use pitch::{PitchTrack, Pyin, PyinConfig};
pub use vector::{feature_name, FeatureVector, FEATURE_LEN, N_MFCC};

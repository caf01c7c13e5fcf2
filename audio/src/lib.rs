//! Audio decoding and normalization.
//!
//! Turns an encoded buffer of any supported container into a canonical
//! waveform: single channel, fixed sample rate, fixed length.
//!
//! - `decode`: container demux + codec decode (Symphonia)
//! - `resample`: sample rate conversion (rubato)
//! - `wav`: in-memory PCM16 WAV intermediate (hound)
//! - `silence`: optional leading/trailing silence trimming
//! - `normalize`: the full pipeline and the [`Waveform`] type
//!
//! # Example
//!
//! ```no_run
//! use voxguard_audio::{NormalizeConfig, Normalizer};
//!
//! let bytes = std::fs::read("speech.mp3").unwrap();
//! let normalizer = Normalizer::new(NormalizeConfig::default()).unwrap();
//! let waveform = normalizer.normalize(&bytes).unwrap();
//! assert_eq!(waveform.len(), 16000 * 4);
//! ```

pub mod decode;
mod error;
pub mod format;
pub mod normalize;
pub mod resample;
pub mod silence;
pub mod wav;

pub use decode::{decode, DecodedAudio};
pub use error::AudioError;
pub use format::{ContainerFormat, SUPPORTED_EXTENSIONS};
pub use normalize::{
    decode_base64, fix_length, normalize, NormalizeConfig, Normalizer, Waveform,
    DEFAULT_DURATION_SECS, DEFAULT_SAMPLE_RATE, TRAINING_TRIM_TOP_DB,
};

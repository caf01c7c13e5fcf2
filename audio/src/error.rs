use thiserror::Error;

/// Errors returned while turning encoded bytes into a waveform.
///
/// Every variant is a decode failure from the caller's point of view;
/// the variants only narrow down where decoding gave up.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("empty audio buffer")]
    Empty,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unrecognized container: {0}")]
    Probe(String),

    #[error("container has no decodable audio track")]
    NoTrack,

    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("decoded audio contains no samples")]
    NoSamples,

    #[error("resample error: {0}")]
    Resample(String),

    #[error("wav intermediate error: {0}")]
    Wav(#[from] hound::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

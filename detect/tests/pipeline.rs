use std::f64::consts::PI;
use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use voxguard_audio::decode_base64;
use voxguard_detect::{
    load_classifier_json, Classifier, Detector, FailureKind, Label, LogisticClassifier,
    PipelineConfig, PredictError,
};
use voxguard_features::FEATURE_LEN;

/// RIFF/WAVE header with a zero-length data chunk.
const HEADER_ONLY_WAV: &str = "UklGRigAAABXQVZFZm10IBAAAAABAAEARKwAAIhYAQACABAAZGF0YQAAAAA=";

fn wav_bytes(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            for _ in 0..channels {
                writer.write_sample((s * 32767.0) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Voice-like test signal: a harmonic series whose f0 glides around 140 Hz
/// with a slow amplitude envelope.
fn synthetic_voice(seconds: f64, sample_rate: u32) -> Vec<f32> {
    let n = (seconds * sample_rate as f64) as usize;
    let mut phase = 0.0f64;
    (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let f0 = 140.0 + 25.0 * (2.0 * PI * 2.5 * t).sin();
            phase += 2.0 * PI * f0 / sample_rate as f64;
            let envelope = 0.6 + 0.4 * (2.0 * PI * 1.5 * t).sin().abs();
            let voice: f64 = (1..=6).map(|h| (h as f64 * phase).sin() / h as f64).sum();
            (0.3 * envelope * voice) as f32
        })
        .collect()
}

/// Leans AI_GENERATED when pitch variation is low.
fn pitch_stability_model() -> Arc<dyn Classifier> {
    let mut weights = vec![0.0; FEATURE_LEN];
    weights[FEATURE_LEN - 1] = -0.2;
    Arc::new(LogisticClassifier::new(weights, 1.0).unwrap())
}

fn detector() -> Detector {
    Detector::new(&PipelineConfig::default(), pitch_stability_model()).unwrap()
}

#[test]
fn scenario_a_silence_is_classified_with_zero_pitch() {
    let wav = wav_bytes(&vec![0.0; 16000], 16000, 1);
    let encoded = base64::engine::general_purpose::STANDARD.encode(&wav);

    let d = detector();
    let waveform = d.normalizer().normalize_base64(&encoded).unwrap();
    assert_eq!(waveform.len(), 64000);

    let detection = d.detect_waveform(&waveform).unwrap();
    assert_eq!(detection.features.len(), FEATURE_LEN);
    assert_eq!(detection.features.pitch_mean(), 0.0);
    assert_eq!(detection.features.pitch_std(), 0.0);
    assert_ne!(detection.result.label, Label::Error);

    let result = d.predict(&decode_base64(&encoded).unwrap());
    assert_eq!(result, detection.result);
}

#[test]
fn scenario_a_header_only_wav_is_a_decode_failure() {
    let bytes = decode_base64(HEADER_ONLY_WAV).unwrap();
    let d = detector();

    let err = d.try_predict(&bytes).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Decode);

    let result = d.predict(&bytes);
    assert_eq!(result.label, Label::Error);
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn scenario_a_short_canonical_length_is_insufficient() {
    let cfg = PipelineConfig {
        duration_secs: 0.5,
        ..PipelineConfig::default()
    };
    let d = Detector::new(&cfg, pitch_stability_model()).unwrap();
    let wav = wav_bytes(&vec![0.0; 16000], 16000, 1);

    match d.try_predict(&wav) {
        Err(err @ PredictError::InsufficientAudio(_)) => {
            assert_eq!(err.kind(), FailureKind::InsufficientAudio);
        }
        other => panic!("expected insufficient audio, got {other:?}"),
    }
    assert_eq!(d.predict(&wav).label, Label::Error);
}

#[test]
fn scenario_b_corrupt_bytes_fail_at_decode() {
    let garbage = b"this is definitely not an audio container, just some text bytes".repeat(20);
    let d = detector();

    match d.try_predict(&garbage) {
        Err(PredictError::Decode(_)) => {}
        other => panic!("expected decode failure, got {other:?}"),
    }
    let result = d.predict(&garbage);
    assert_eq!(result.label, Label::Error);
    assert_eq!(result.confidence, 0.0);
    assert!(result.explanation.contains("DecodeFailure"));
}

/// Deterministic xorshift64 bytes.
fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

#[test]
fn scenario_b_random_bytes_fail_at_decode() {
    let d = detector();
    for seed in 0..200u64 {
        let bytes = random_bytes(seed, 4096 + (seed as usize * 53) % 8192);

        match d.try_predict(&bytes) {
            Err(PredictError::Decode(_)) => {}
            other => panic!("seed {seed}: expected decode failure, got {other:?}"),
        }
        let result = d.predict(&bytes);
        assert_eq!(result.label, Label::Error, "seed {seed}");
        assert_eq!(result.confidence, 0.0, "seed {seed}");
    }
}

#[test]
fn scenario_c_voice_is_deterministic_with_rich_features() {
    let voice = synthetic_voice(4.0, 44100);
    let wav = wav_bytes(&voice, 44100, 2);
    let d = detector();

    let first = d.try_predict(&wav).unwrap();
    let mfcc_stats = &first.features.as_slice()[..80];
    assert!(mfcc_stats.iter().all(|&v| v != 0.0));
    assert!(first.features.pitch_mean() > 100.0 && first.features.pitch_mean() < 200.0);
    assert!(first.features.pitch_std() > 0.0);

    for _ in 0..2 {
        let again = d.try_predict(&wav).unwrap();
        assert_eq!(again.features, first.features);
        assert_eq!(again.result, first.result);
    }
}

#[test]
fn label_and_confidence_match_probabilities() {
    let d = detector();
    let inputs = [
        wav_bytes(&synthetic_voice(2.0, 16000), 16000, 1),
        wav_bytes(&vec![0.0; 20000], 22050, 1),
        wav_bytes(&synthetic_voice(5.0, 48000), 48000, 2),
    ];
    for wav in &inputs {
        let detection = d.try_predict(wav).unwrap();
        let probs = detection.probabilities;
        let winner = probs.argmax();
        assert_eq!(detection.result.label, Label::from(winner));
        assert_eq!(detection.result.confidence, probs.get(winner));
        assert!((0.0..=1.0).contains(&detection.result.confidence));
        assert!(detection.result.confidence >= 0.5);
    }
}

#[test]
fn concurrent_requests_share_one_detector() {
    let d = Arc::new(detector());
    let wav = wav_bytes(&synthetic_voice(1.5, 16000), 16000, 1);
    let expected = d.predict(&wav);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let d = Arc::clone(&d);
                let wav = &wav;
                s.spawn(move || d.predict(wav))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn artifact_driven_detector() {
    let mut weights = vec![0.0; FEATURE_LEN];
    weights[83] = 50.0;
    let json = serde_json::json!({
        "kind": "logistic",
        "weights": weights,
        "bias": -1.0,
    });
    let model: Arc<dyn Classifier> =
        Arc::from(load_classifier_json(json.to_string().as_bytes()).unwrap());
    let d = Detector::new(&PipelineConfig::default(), model).unwrap();

    // Silence: rms 0, decision -1 -> HUMAN.
    let silent = d.predict(&wav_bytes(&vec![0.0; 16000], 16000, 1));
    assert_eq!(silent.label, Label::Human);

    // Loud voice: rms * 50 - 1 > 0 -> AI_GENERATED under this toy model.
    let loud = d.predict(&wav_bytes(&synthetic_voice(4.0, 16000), 16000, 1));
    assert_eq!(loud.label, Label::AiGenerated);
}

//! Batch prediction over files and directories.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};
use voxguard_detect::{load_classifier_json, registry, Detector, Label, PredictionResult};

use super::{collect_audio_files, format_of, get_config, open_output, pipeline_config};
use crate::Cli;

/// Classify audio files.
///
/// Directories are searched recursively for supported audio files. A file
/// that fails to decode or classify is reported as ERROR and the batch
/// continues.
#[derive(Args)]
pub struct PredictCommand {
    /// Classifier artifact (JSON); overrides `model` in the config file
    #[arg(short = 'm', long)]
    pub model: Option<PathBuf>,

    /// Canonical clip length in seconds
    #[arg(long)]
    pub duration: Option<f32>,

    /// Trim leading/trailing audio quieter than this many dB below the peak
    #[arg(long)]
    pub trim_db: Option<f32>,

    /// Audio files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: String,
    #[serde(flatten)]
    result: &'a PredictionResult,
}

impl PredictCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let pipeline = pipeline_config(&cfg, self.duration, self.trim_db)?;

        let model_path = self
            .model
            .clone()
            .or_else(|| cfg.model.clone())
            .ok_or_else(|| anyhow::anyhow!("no classifier given, use --model or set `model` in the config"))?;
        let artifact = std::fs::read(&model_path)
            .with_context(|| format!("read model {}", model_path.display()))?;
        let classifier = load_classifier_json(&artifact)
            .with_context(|| format!("load model {}", model_path.display()))?;
        registry::install(Arc::from(classifier))?;

        let detector = Detector::from_registry(&pipeline)?;
        let files = collect_audio_files(&self.paths)?;
        if files.is_empty() {
            anyhow::bail!("no supported audio files found");
        }

        let mut out = open_output(cli)?;
        let mut failed = 0usize;
        for path in &files {
            let result = predict_file(&detector, path);
            if result.label == Label::Error {
                failed += 1;
            }
            write_report(&mut out, cli.json, path, &result)?;
        }
        out.flush()?;

        info!(files = files.len(), failed, "batch complete");
        Ok(())
    }
}

fn predict_file(detector: &Detector, path: &Path) -> PredictionResult {
    match std::fs::read(path) {
        Ok(bytes) => detector.predict_as(&bytes, format_of(path)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read file");
            PredictionResult {
                label: Label::Error,
                confidence: 0.0,
                explanation: format!("read failed: {e}"),
            }
        }
    }
}

fn write_report(
    out: &mut dyn Write,
    json: bool,
    path: &Path,
    result: &PredictionResult,
) -> anyhow::Result<()> {
    if json {
        let report = FileReport {
            path: path.display().to_string(),
            result,
        };
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    } else if result.label == Label::Error {
        writeln!(out, "{} | {} | {}", path.display(), result.label, result.explanation)?;
    } else {
        writeln!(
            out,
            "{} | {} | {:.3}",
            path.display(),
            result.label,
            result.confidence
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(json: bool, result: &PredictionResult) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, json, Path::new("data/a.wav"), result).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_and_json_reports() {
        let ok = PredictionResult {
            label: Label::AiGenerated,
            confidence: 0.87654,
            explanation: "regular".into(),
        };
        assert_eq!(render(false, &ok), "data/a.wav | AI_GENERATED | 0.877\n");

        let line = render(true, &ok);
        let v: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(v["path"], "data/a.wav");
        assert_eq!(v["label"], "AI_GENERATED");
        assert_eq!(v["explanation"], "regular");

        let err = PredictionResult {
            label: Label::Error,
            confidence: 0.0,
            explanation: "DecodeFailure at normalize stage: empty audio buffer".into(),
        };
        assert!(render(false, &err).contains("| ERROR | DecodeFailure"));
    }
}

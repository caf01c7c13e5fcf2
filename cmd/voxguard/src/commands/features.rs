//! Feature vector dump for one file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::{Serialize, Serializer};
use voxguard_audio::Normalizer;
use voxguard_features::{Extractor, FeatureVector};

use super::{format_of, get_config, open_output, pipeline_config};
use crate::Cli;

/// Print the 86 named features of an audio file.
///
/// The output is the same vector the classifier sees, suitable as a
/// training row for offline model fitting.
#[derive(Args)]
pub struct FeaturesCommand {
    /// Canonical clip length in seconds
    #[arg(long)]
    pub duration: Option<f32>,

    /// Trim leading/trailing audio quieter than this many dB below the peak
    #[arg(long)]
    pub trim_db: Option<f32>,

    /// Print a plain array instead of a name -> value map
    #[arg(long)]
    pub raw: bool,

    /// Audio file
    pub path: PathBuf,
}

#[derive(Serialize)]
struct FeatureDump<'a> {
    path: String,
    features: NamedFeatures<'a>,
}

/// Serializes as a map in layout order.
struct NamedFeatures<'a>(&'a FeatureVector);

impl Serialize for NamedFeatures<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.named())
    }
}

impl FeaturesCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let pipeline = pipeline_config(&cfg, self.duration, self.trim_db)?;

        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let normalizer = Normalizer::new(pipeline.normalize_config())?;
        let extractor = Extractor::new(pipeline.extractor_config())?;

        let waveform = normalizer
            .normalize_as(&bytes, format_of(&self.path))
            .with_context(|| format!("decode {}", self.path.display()))?;
        let features = extractor
            .extract(waveform.samples())
            .with_context(|| format!("extract {}", self.path.display()))?;

        let mut out = open_output(cli)?;
        let text = if self.raw {
            serde_json::to_string(&features)?
        } else {
            serde_json::to_string_pretty(&self.dump(&features))?
        };
        writeln!(out, "{text}")?;
        out.flush()?;
        Ok(())
    }

    fn dump<'a>(&self, features: &'a FeatureVector) -> FeatureDump<'a> {
        FeatureDump {
            path: self.path.display().to_string(),
            features: NamedFeatures(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxguard_features::FEATURE_LEN;

    #[test]
    fn dump_keeps_layout_order() {
        let values: Vec<f32> = (0..FEATURE_LEN).map(|i| i as f32).collect();
        let features = FeatureVector::try_from(values).unwrap();
        let cmd = FeaturesCommand {
            duration: None,
            trim_db: None,
            raw: false,
            path: PathBuf::from("clip.wav"),
        };
        let json = serde_json::to_string(&cmd.dump(&features)).unwrap();
        let first = json.find("\"mfcc_mean_0\"").unwrap();
        let second = json.find("\"mfcc_mean_1\"").unwrap();
        let tenth = json.find("\"mfcc_mean_10\"").unwrap();
        let pitch = json.find("\"pitch_std\"").unwrap();
        assert!(first < second && second < tenth && tenth < pitch);
        assert!(json.starts_with("{\"path\":\"clip.wav\""));
    }
}

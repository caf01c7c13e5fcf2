//! Utility functions for CLI commands.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use voxguard_audio::ContainerFormat;
use voxguard_detect::PipelineConfig;

use crate::config::{load_config, Config};
use crate::Cli;

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(cli.config.as_deref())
}

/// Pipeline settings from the config file with command-line overrides applied.
pub fn pipeline_config(
    cfg: &Config,
    duration: Option<f32>,
    trim_db: Option<f32>,
) -> anyhow::Result<PipelineConfig> {
    let mut pipeline = cfg.pipeline.clone();
    if let Some(d) = duration {
        pipeline.duration_secs = d;
    }
    if trim_db.is_some() {
        pipeline.trim_silence_db = trim_db;
    }
    pipeline.validate()?;
    Ok(pipeline)
}

/// Container format implied by a file extension.
pub fn format_of(path: &Path) -> Option<ContainerFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ContainerFormat::from_extension)
}

/// Expands files and directories into the audio files they contain.
///
/// Directories are walked recursively in sorted order and filtered by
/// supported extension. Explicit file arguments are kept as given.
pub fn collect_audio_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort(true) {
                let entry = entry?;
                let p = entry.path();
                if entry.file_type().is_file() && format_of(&p).is_some() {
                    files.push(p);
                }
            }
        } else if path.exists() {
            files.push(path.clone());
        } else {
            anyhow::bail!("{} does not exist", path.display());
        }
    }
    Ok(files)
}

/// Opens the `-o` file, or stdout.
pub fn open_output(cli: &Cli) -> anyhow::Result<Box<dyn Write>> {
    Ok(match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

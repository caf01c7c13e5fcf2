//! voxguard - classify speech recordings as human or synthesized.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{FeaturesCommand, PredictCommand};

/// voxguard - detect synthesized speech.
///
/// Audio is decoded from any supported container (wav, mp3, m4a, flac,
/// ogg, aac), normalized to 16 kHz mono, summarized as 86 acoustic
/// features and scored by a trained classifier artifact.
///
/// Settings are read from ~/.voxguard/config.yaml when present.
#[derive(Parser)]
#[command(name = "voxguard")]
#[command(about = "Human vs. synthetic speech detection")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.voxguard/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify audio files or directories
    Predict(PredictCommand),
    /// Dump the feature vector of one audio file
    Features(FeaturesCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Predict(cmd) => cmd.run(&cli),
        Commands::Features(cmd) => cmd.run(&cli),
    }
}

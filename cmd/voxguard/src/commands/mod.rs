//! CLI commands module.

mod features;
mod predict;
mod util;

pub use features::FeaturesCommand;
pub use predict::PredictCommand;

pub(crate) use util::*;

//! Top-level CLI error.

use thiserror::Error;

use blueprint::{BlueprintError, BuildError, RenderError};

use crate::config::ConfigError;

/// Anything that can stop the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Blueprint(#[from] BlueprintError),
}

impl From<BuildError> for CliError {
    fn from(err: BuildError) -> Self {
        Self::Blueprint(err.into())
    }
}

impl From<RenderError> for CliError {
    fn from(err: RenderError) -> Self {
        Self::Blueprint(err.into())
    }
}

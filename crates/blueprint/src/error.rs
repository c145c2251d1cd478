//! Error types for Blueprint rendering.
//!
//! [`RenderError`] covers everything that can go wrong between a finished
//! graph and the image on disk. [`BlueprintError`] is the top-level error of
//! the crate and also wraps construction failures from `blueprint-core`.

use std::{io, process::ExitStatus, time::Duration};

use thiserror::Error;

use blueprint_core::BuildError;

/// Errors raised while laying out and exporting a diagram.
///
/// Whenever one of these is returned, no output artifact has been written.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Layout engine `{program}` was not found")]
    EngineMissing { program: String },

    #[error("Failed to start layout engine `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Layout engine `{program}` failed ({status}): {stderr}")]
    Engine {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Layout engine `{program}` produced no output")]
    EmptyOutput { program: String },

    #[error("Layout engine `{program}` timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("Invalid style: {0}")]
    Style(String),

    #[error("I/O error while running the layout engine: {0}")]
    Io(#[from] io::Error),
}

/// The main error type for Blueprint operations.
#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

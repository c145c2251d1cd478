//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Every error gets a
//! stable code and, where there is something the user can do about it, a help
//! line.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use blueprint::{BlueprintError, BuildError, RenderError, Warning};

use crate::{config::ConfigError, error::CliError};

/// Adapter for a [`CliError`].
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl ErrorAdapter<'_> {
    fn code_str(&self) -> &'static str {
        match self.0 {
            CliError::Config(_) => "blueprint::config",
            CliError::Blueprint(BlueprintError::Build(_)) => "blueprint::build",
            CliError::Blueprint(BlueprintError::Render(RenderError::Timeout { .. })) => {
                "blueprint::render::timeout"
            }
            CliError::Blueprint(BlueprintError::Render(RenderError::EngineMissing { .. })) => {
                "blueprint::render::engine_missing"
            }
            CliError::Blueprint(BlueprintError::Render(_)) => "blueprint::render",
            CliError::Blueprint(BlueprintError::Io(_)) => "blueprint::io",
        }
    }

    fn help_str(&self) -> Option<String> {
        let help = match self.0 {
            CliError::Config(ConfigError::MissingFile(_)) => {
                "Check the --config path, or omit it to use the default search locations"
            }
            CliError::Config(ConfigError::Parse(_)) => {
                "The configuration file must be valid TOML with [engine], [output], [style], [icons] and [diagram] sections"
            }
            CliError::Blueprint(BlueprintError::Build(BuildError::ScopeMismatch { .. })) => {
                "Clusters must be closed innermost first"
            }
            CliError::Blueprint(BlueprintError::Build(BuildError::ArityMismatch { .. })) => {
                "Pairwise connections need collections of the same length"
            }
            CliError::Blueprint(BlueprintError::Render(RenderError::EngineMissing {
                program,
            })) => {
                return Some(format!(
                    "Install Graphviz so that `{program}` is on PATH, or set [engine] program in the configuration"
                ));
            }
            CliError::Blueprint(BlueprintError::Render(RenderError::Timeout { .. })) => {
                "Raise [engine] timeout_secs in the configuration, or simplify the diagram"
            }
            _ => return None,
        };
        Some(help.to_string())
    }
}

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_str()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Adapter for a non-fatal render [`Warning`].
pub struct WarningAdapter<'a>(pub &'a Warning);

impl fmt::Debug for WarningAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for WarningAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for WarningAdapter<'_> {}

impl MietteDiagnostic for WarningAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            Warning::IconNotFound { .. } => "blueprint::icon_not_found",
            Warning::ViewerFailed { .. } => "blueprint::viewer",
        };
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Warning)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self.0 {
            Warning::IconNotFound { .. } => Some(Box::new(
                "Pass --icons <dir> or set [icons] directory to a tree of <segment>/<name>.png files",
            )),
            Warning::ViewerFailed { .. } => None,
        }
    }
}

/// A reportable diagnostic that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A fatal error.
    Error(ErrorAdapter<'a>),
    /// A non-fatal warning.
    Warning(WarningAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Error(e) => fmt::Display::fmt(e, f),
            Reportable::Warning(w) => fmt::Display::fmt(w, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Error(e) => e.source(),
            Reportable::Warning(_) => None,
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Error(e) => e.code(),
            Reportable::Warning(w) => w.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Error(e) => e.severity(),
            Reportable::Warning(w) => w.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Error(e) => e.help(),
            Reportable::Warning(w) => w.help(),
        }
    }
}

/// Convert a [`CliError`] into a list of reportable errors.
pub fn to_reportables(err: &CliError) -> Vec<Reportable<'_>> {
    vec![Reportable::Error(ErrorAdapter(err))]
}

/// Convert render warnings into reportable diagnostics.
pub fn warnings_to_reportables(warnings: &[Warning]) -> Vec<Reportable<'_>> {
    warnings
        .iter()
        .map(|warning| Reportable::Warning(WarningAdapter(warning)))
        .collect()
}

//! Configuration types for Blueprint rendering.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out, styled and exported. All types implement
//! [`serde::Deserialize`] so they can be loaded from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`EngineConfig`] - Which layout program to run and how long to wait for it.
//! - [`OutputConfig`] - Which artifact formats to produce.
//! - [`StyleConfig`] - Visual defaults such as background and edge color.
//! - [`IconConfig`] - Where category glyphs are looked up.
//!
//! # Example
//!
//! ```
//! # use blueprint::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.engine().program(), "dot");
//! assert!(config.style().background_color().is_ok());
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use blueprint_core::color::Color;

use crate::export::OutputFormat;

const DEFAULT_PROGRAM: &str = "dot";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout engine section.
    #[serde(default)]
    engine: EngineConfig,

    /// Output section.
    #[serde(default)]
    output: OutputConfig,

    /// Style section.
    #[serde(default)]
    style: StyleConfig,

    /// Icon section.
    #[serde(default)]
    icons: IconConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        engine: EngineConfig,
        output: OutputConfig,
        style: StyleConfig,
        icons: IconConfig,
    ) -> Self {
        Self {
            engine,
            output,
            style,
            icons,
        }
    }

    /// Returns the layout engine configuration.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the icon configuration.
    pub fn icons(&self) -> &IconConfig {
        &self.icons
    }

    /// Replaces the requested output formats.
    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.output.formats = formats;
        self
    }

    /// Replaces the icon directory.
    pub fn with_icon_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.icons.directory = Some(directory.into());
        self
    }
}

/// Layout engine invocation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Program to run, looked up on `PATH` unless it is a path.
    program: String,

    /// Upper bound for a single engine run, in seconds.
    timeout_secs: u64,
}

impl EngineConfig {
    /// Creates a new [`EngineConfig`].
    ///
    /// # Arguments
    ///
    /// * `program` - Name or path of the Graphviz executable.
    /// * `timeout` - Upper bound for a single engine run.
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout_secs: timeout.as_secs().max(1),
        }
    }

    /// Returns the program name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the timeout for a single engine run.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Output artifact settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Formats rendered by default.
    formats: Vec<OutputFormat>,
}

impl OutputConfig {
    /// Creates a new [`OutputConfig`] with the given formats.
    pub fn new(formats: Vec<OutputFormat>) -> Self {
        Self { formats }
    }

    /// Returns the requested formats, [`OutputFormat::Png`] if none are set.
    pub fn formats(&self) -> Vec<OutputFormat> {
        if self.formats.is_empty() {
            return vec![OutputFormat::default()];
        }
        self.formats.clone()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::default()],
        }
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Fields that are not set fall back to renderer defaults. Attributes set on
/// the diagram itself always win over these.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background color of the whole diagram, as a color string.
    #[serde(default)]
    background_color: Option<String>,

    /// Default edge color, as a color string.
    #[serde(default)]
    edge_color: Option<String>,

    /// Font family used for all labels.
    #[serde(default)]
    font_name: Option<String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.background_color.as_deref(), "background")
    }

    /// Returns the parsed default edge [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn edge_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.edge_color.as_deref(), "edge")
    }

    /// Returns the configured font family, if any.
    pub fn font_name(&self) -> Option<&str> {
        self.font_name.as_deref()
    }
}

fn parse_color(value: Option<&str>, what: &str) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {what} color in config: {err}"))
}

/// Icon lookup settings.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IconConfig {
    /// Root directory of the icon tree.
    #[serde(default)]
    directory: Option<PathBuf>,
}

impl IconConfig {
    /// Returns the icon root directory, if configured.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.engine().program(), "dot");
        assert_eq!(config.engine().timeout(), Duration::from_secs(30));
        assert_eq!(config.output().formats(), vec![OutputFormat::Png]);
        assert_eq!(config.style().background_color(), Ok(None));
        assert!(config.icons().directory().is_none());
    }

    #[test]
    fn test_empty_formats_fall_back_to_png() {
        let output = OutputConfig::new(Vec::new());
        assert_eq!(output.formats(), vec![OutputFormat::Png]);
    }

    #[test]
    fn test_invalid_style_color() {
        let style = StyleConfig {
            background_color: Some("not-a-color".to_string()),
            ..StyleConfig::default()
        };

        let err = style.background_color().unwrap_err();
        assert!(err.contains("Invalid background color"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::default()
            .with_formats(vec![OutputFormat::Svg, OutputFormat::Dot])
            .with_icon_directory("/opt/icons");

        assert_eq!(
            config.output().formats(),
            vec![OutputFormat::Svg, OutputFormat::Dot]
        );
        assert_eq!(config.icons().directory(), Some(Path::new("/opt/icons")));
    }
}

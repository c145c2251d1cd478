//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).
//! A configuration file holds the renderer sections of
//! [`AppConfig`](blueprint::config::AppConfig) plus an optional `[diagram]`
//! section with layout defaults for the rendered diagram.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use blueprint::{CurveStyle, Direction, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Everything a configuration file can hold.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Renderer sections (`engine`, `output`, `style`, `icons`).
    #[serde(flatten)]
    app: AppConfig,

    /// Diagram layout defaults.
    #[serde(default)]
    diagram: DiagramDefaults,
}

impl CliConfig {
    /// Returns the renderer configuration.
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Consumes the configuration, returning the renderer part.
    pub fn into_app(self) -> AppConfig {
        self.app
    }

    /// Returns the diagram layout defaults.
    pub fn diagram(&self) -> &DiagramDefaults {
        &self.diagram
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let style = self.app.style();
        style.background_color().map_err(ConfigError::Validation)?;
        style.edge_color().map_err(ConfigError::Validation)?;

        if self.app.engine().program().trim().is_empty() {
            return Err(ConfigError::Validation(
                "Engine program must not be empty".to_string(),
            ));
        }
        if self.app.engine().timeout().is_zero() {
            return Err(ConfigError::Validation(
                "Engine timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The `[diagram]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagramDefaults {
    #[serde(default)]
    direction: Option<Direction>,

    #[serde(default)]
    curve_style: Option<CurveStyle>,

    #[serde(default)]
    show: bool,
}

impl DiagramDefaults {
    /// Layout direction, if configured.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Edge curve style, if configured.
    pub fn curve_style(&self) -> Option<CurveStyle> {
        self.curve_style
    }

    /// Whether to open the rendered image.
    pub fn show(&self) -> bool {
        self.show
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (blueprint/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path to config file
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or fails validation
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<CliConfig, ConfigError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("blueprint/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "blueprint", "blueprint") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(CliConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing or validation fails
fn load_config_file(path: impl AsRef<Path>) -> Result<CliConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: CliConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;

    Ok(config)
}

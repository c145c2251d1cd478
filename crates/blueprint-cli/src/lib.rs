//! CLI logic for the Blueprint diagram renderer.
//!
//! This module contains the core CLI logic: it loads configuration, builds the
//! Liquibook architecture diagram and renders it through Graphviz.

pub mod architecture;
pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::Args;
pub use config::ConfigError;
pub use error::CliError;

use log::info;

use blueprint::{Diagram, RenderReport, Renderer};

/// Run the Blueprint CLI application
///
/// This builds the architecture diagram, applies command-line and
/// configuration overrides, and writes one artifact per requested format.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - Configuration loading errors
/// - Diagram construction errors
/// - Layout engine errors
/// - File I/O errors
pub fn run(args: &Args) -> Result<RenderReport, CliError> {
    let cli_config = config::load_config(args.config.as_ref())?;
    let defaults = cli_config.diagram().clone();

    let mut app_config = cli_config.into_app();
    if !args.formats.is_empty() {
        app_config = app_config.with_formats(args.formats.clone());
    }
    if let Some(icons) = &args.icons {
        app_config = app_config.with_icon_directory(icons);
    }

    let mut options = architecture::options().with_show(args.show || defaults.show());
    if let Some(output) = &args.output {
        options = options.with_output(output);
    }
    if let Some(direction) = args.direction.or(defaults.direction()) {
        options = options.with_direction(direction);
    }
    if let Some(curve_style) = defaults.curve_style() {
        options = options.with_curve_style(curve_style);
    }

    info!(
        title = options.title(),
        output_path:? = options.output(),
        formats:? = app_config.output().formats();
        "Processing diagram"
    );

    let graph = Diagram::build(options, architecture::build)?;

    let report = Renderer::new(app_config).render(&graph)?;

    for artifact in report.artifacts() {
        info!(output_file:? = artifact.path(), bytes = artifact.size(); "Diagram exported successfully");
    }

    Ok(report)
}

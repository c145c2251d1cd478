//! Command-line argument definitions for the Blueprint CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the output path and formats, layout
//! overrides, configuration file selection, and logging verbosity.

use clap::Parser;

use blueprint::{Direction, OutputFormat};

/// Command-line arguments for the Blueprint diagram renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Output path; the format extension is added per artifact
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format (png, jpg, svg, pdf, dot); repeat for several
    #[arg(short, long = "format", value_name = "FORMAT")]
    pub formats: Vec<OutputFormat>,

    /// Layout direction (TB, BT, LR, RL)
    #[arg(short, long)]
    pub direction: Option<Direction>,

    /// Open the rendered image in the default viewer
    #[arg(long)]
    pub show: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Root directory of the icon tree
    #[arg(long)]
    pub icons: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

//! Blueprint CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};
use miette::GraphicalReportHandler;

use blueprint_cli::{
    Args,
    error_adapter::{Reportable, to_reportables, warnings_to_reportables},
};

fn render(reporter: &GraphicalReportHandler, reportable: &Reportable<'_>) -> String {
    let mut writer = String::new();
    if reporter.render_report(&mut writer, reportable).is_err() {
        writer = reportable.to_string();
    }
    writer
}

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Blueprint");
    debug!(args:?; "Parsed arguments");

    let reporter = GraphicalReportHandler::new();

    match blueprint_cli::run(&args) {
        Ok(report) => {
            for reportable in warnings_to_reportables(report.warnings()) {
                warn!("{}", render(&reporter, &reportable));
            }
            info!("Completed successfully");
        }
        Err(err) => {
            for reportable in to_reportables(&err) {
                error!("{}", render(&reporter, &reportable));
            }
            process::exit(1);
        }
    }
}

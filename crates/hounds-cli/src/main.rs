//! Hounds CLI - Main entry point

use clap::Parser;
use colored::Colorize;
use hounds_cli::Cli;
use hounds_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // Defaults may live in a .env next to the collector output
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .output(LogOutput::Console)
        .log_file_prefix("hounds")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI still works without logging
    let _guard = init_logging(&log_config).ok().flatten();

    match hounds_cli::run(&cli).await {
        Ok(summary) => {
            summary.print();
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(error = %e, "Run aborted");
            eprintln!("{} {}", "Error:".red().bold(), e);
            if e.is_setup_failure() {
                eprintln!("No files were processed.");
            }
            ExitCode::FAILURE
        },
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Issuetrend - chart the open issue count of a GitHub repository over time.
//!
//! Fetches every label and issue of a repository, replays their open and
//! close events, and shows how many issues were open at each moment, in
//! total or per label.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;
mod provider;

pub use provider::CliTokenProvider;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use issuetrend_core::config;
use tracing::debug;

use crate::cli::{Cli, OutputContext};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output, cli.quiet);

    let result = match config::load_config().context("Failed to load configuration") {
        Ok(config) => {
            debug!("Configuration loaded successfully");
            if !config.ui.color {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
            commands::run(cli.command, output_ctx, &config).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", errors::format_error(&e));
            ExitCode::FAILURE
        }
    }
}

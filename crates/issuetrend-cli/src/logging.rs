// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the issuetrend CLI.
//!
//! Uses `tracing` with `tracing-subscriber` for structured logging to stderr.
//! Log level can be controlled via the `RUST_LOG` environment variable.
//!
//! # Examples
//!
//! ```bash
//! # Default: warnings only
//! issuetrend chart rust-lang/rust
//!
//! # Page-by-page fetch details
//! RUST_LOG=issuetrend=debug issuetrend chart rust-lang/rust
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging subsystem.
///
/// `RUST_LOG` wins when set. Otherwise `-v` raises issuetrend's own events
/// to info; dependencies stay quiet either way.
pub fn init_logging(verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let default_filter = if verbose {
        "issuetrend=info,octocrab=error"
    } else {
        "issuetrend=warn,octocrab=error"
    };
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .expect("valid default filter directives");

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the issuetrend CLI.

pub mod auth;
pub mod chart;
pub mod completion;
pub mod labels;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use issuetrend_core::{AppConfig, RepoRef, Session, Snapshot, load_repository};

use crate::CliTokenProvider;
use crate::cli::{AuthCommand, Commands, CompletionCommand, OutputContext};
use crate::output;

/// Creates a percentage progress bar (only if interactive and enabled).
fn maybe_progress(ctx: &OutputContext, config: &AppConfig, message: &str) -> Option<ProgressBar> {
    if ctx.is_interactive() && config.ui.progress_bars {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos:>3}%")
                .expect("Invalid progress template")
                .progress_chars("=> "),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    } else {
        None
    }
}

/// Loads `target` into `session`, driving a progress bar from page progress.
async fn fetch_with_progress(
    session: &mut Session,
    target: &RepoRef,
    use_cache: bool,
    ctx: &OutputContext,
    config: &AppConfig,
) -> Result<Arc<Snapshot>> {
    let bar = maybe_progress(ctx, config, &format!("Fetching {target}"));
    let on_progress = |percent: u8| {
        if let Some(bar) = &bar {
            bar.set_position(u64::from(percent));
        }
    };

    let result = load_repository(
        session,
        &CliTokenProvider,
        target,
        config,
        use_cache,
        &on_progress,
    )
    .await;

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    Ok(result?)
}

/// Dispatch to the appropriate command handler.
pub async fn run(command: Commands, ctx: OutputContext, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Chart(args) => {
            let result = chart::run(args, &ctx, config).await?;
            output::render(&result, &ctx)
        }

        Commands::Labels(args) => {
            let result = labels::run(args, &ctx, config).await?;
            output::render(&result, &ctx)
        }

        Commands::Auth(auth_cmd) => match auth_cmd {
            AuthCommand::Login => auth::run_login(),
            AuthCommand::Logout => auth::run_logout(),
            AuthCommand::Status => {
                let result = auth::run_status();
                output::render(&result, &ctx)
            }
        },

        Commands::Completion(completion_cmd) => match completion_cmd {
            CompletionCommand::Generate { shell } => completion::run_generate(shell),
            CompletionCommand::Install { shell, dry_run } => {
                completion::run_install(shell, dry_run)
            }
        },
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for issuetrend.
//!
//! Uses clap's derive API for declarative CLI parsing.

use std::io::IsTerminal;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use issuetrend_core::SelectionMode;

/// Extended help text for the generate subcommand with shell-specific examples.
const COMPLETION_GENERATE_HELP: &str = r#"EXAMPLES

  bash
    Add to ~/.bashrc or ~/.bash_profile:
      eval "$(issuetrend completion generate bash)"

  zsh
    Generate completion file:
      mkdir -p ~/.zsh/completions
      issuetrend completion generate zsh > ~/.zsh/completions/_issuetrend

    Add to ~/.zshrc (before compinit):
      fpath=(~/.zsh/completions $fpath)
      autoload -U compinit && compinit -i

  fish
    Generate completion file:
      issuetrend completion generate fish > ~/.config/fish/completions/issuetrend.fish
"#;

const CHART_HELP: &str = r"EXAMPLES

  Total open issues of a repository:
    issuetrend chart rust-lang/rust

  One line per label next to the total:
    issuetrend chart rust-lang/rust -l C-bug -l A-diagnostics

  Issues carrying both labels:
    issuetrend chart rust-lang/rust -l C-bug -l A-diagnostics --mode and --hide-total
";

/// Output format for CLI results.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// YAML output for programmatic consumption
    Yaml,
    /// Markdown output for GitHub comments
    Markdown,
}

/// Global output configuration passed to commands.
#[derive(Clone)]
pub struct OutputContext {
    /// Output format (text, json, yaml)
    pub format: OutputFormat,
    /// Suppress non-essential output (spinners, progress)
    pub quiet: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, quiet: bool) -> Self {
        Self {
            format,
            quiet,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (progress bars, colors) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet && matches!(self.format, OutputFormat::Text)
    }
}

/// Issuetrend - chart open GitHub issues over time.
///
/// Fetches every issue and label of a repository and shows how many issues
/// were open at each point in time, in total, per label, or for issues
/// carrying several labels at once.
#[derive(Parser)]
#[command(name = "issuetrend")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json, yaml, markdown)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Suppress non-essential output (progress bars)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (info-level logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Chart open issues over time
    #[command(after_long_help = CHART_HELP)]
    Chart(ChartArgs),

    /// List the labels of a repository with their open issue counts
    Labels(RepoArgs),

    /// Manage GitHub authentication
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Generate or install shell completion scripts
    #[command(subcommand)]
    Completion(CompletionCommand),
}

/// Repository selection shared by data commands.
#[derive(Args)]
pub struct RepoArgs {
    /// Repository as OWNER/REPO or URL (defaults to the last charted one)
    pub repo: Option<String>,

    /// Ignore cached repository data and fetch again
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments of the chart command.
#[derive(Args)]
pub struct ChartArgs {
    /// Repository and cache options
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Label to chart, in addition to the total (repeatable)
    #[arg(long = "label", short = 'l', value_name = "NAME")]
    pub labels: Vec<String>,

    /// How labels combine: one line each (or) or one line of issues carrying all (and)
    #[arg(long, short = 'm', value_enum)]
    pub mode: Option<ModeArg>,

    /// Leave the total line out of the selection (needed for and-mode intersections)
    #[arg(long)]
    pub hide_total: bool,

    /// Number of most recent samples listed in the text table
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

/// Selection mode as a CLI value.
#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// One line per label
    Or,
    /// One line of issues carrying every label
    And,
}

impl From<ModeArg> for SelectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Or => SelectionMode::Or,
            ModeArg::And => SelectionMode::And,
        }
    }
}

/// Authentication subcommands
#[derive(Subcommand)]
pub enum AuthCommand {
    /// Store a GitHub token (or LOGIN:TOKEN) in the system keyring
    Login,

    /// Remove stored credentials
    Logout,

    /// Show current authentication status
    Status,
}

/// Completion subcommands
#[derive(Subcommand)]
pub enum CompletionCommand {
    /// Generate completion script for a shell (output to stdout)
    #[command(after_long_help = COMPLETION_GENERATE_HELP)]
    Generate {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Install completion script to standard location
    Install {
        /// Shell to install completions for (auto-detected from $SHELL if not provided)
        #[arg(long, value_enum)]
        shell: Option<Shell>,

        /// Preview installation without writing files
        #[arg(long)]
        dry_run: bool,
    },
}

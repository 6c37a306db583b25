// SPDX-License-Identifier: Apache-2.0

//! Shell completion generation and installation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use console::style;
use tracing::debug;

use crate::cli::Cli;

/// Where a shell's completion script goes, relative to the home directory,
/// and how to enable it.
fn shell_target(shell: Shell) -> Result<(&'static str, &'static str)> {
    match shell {
        Shell::Bash => Ok((
            ".bash_completion.d/issuetrend",
            "Add to ~/.bashrc or ~/.bash_profile:\n  source ~/.bash_completion.d/issuetrend",
        )),
        Shell::Zsh => Ok((
            ".zsh/completions/_issuetrend",
            "Add to ~/.zshrc (before compinit):\n  fpath=(~/.zsh/completions $fpath)\n  autoload -U compinit && compinit -i",
        )),
        Shell::Fish => Ok((
            ".config/fish/completions/issuetrend.fish",
            "Completions are loaded from ~/.config/fish/completions/ automatically.",
        )),
        Shell::Elvish => Ok((
            ".local/share/elvish/lib/issuetrend.elv",
            "Add to ~/.config/elvish/rc.elv:\n  use issuetrend",
        )),
        _ => Err(anyhow!(
            "Unsupported shell: {shell:?}. Supported shells: bash, zsh, fish, elvish"
        )),
    }
}

fn completion_path(home: &Path, shell: Shell) -> Result<PathBuf> {
    Ok(home.join(shell_target(shell)?.0))
}

/// Detect the current shell from `$SHELL`.
fn detect_shell() -> Result<Shell> {
    let shell_env = std::env::var("SHELL")
        .context("$SHELL environment variable not set. Use --shell to specify.")?;

    let shell_name = Path::new(&shell_env)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Could not parse shell name from $SHELL"))?;

    match shell_name {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "elvish" => Ok(Shell::Elvish),
        _ => Err(anyhow!(
            "Unsupported shell: {shell_name}. Supported: bash, zsh, fish, elvish"
        )),
    }
}

fn completion_script(shell: Shell) -> Vec<u8> {
    let mut script = Vec::new();
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut script);
    script
}

/// Generate completion script to stdout.
pub fn run_generate(shell: Shell) -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(&completion_script(shell))?;
    stdout.flush()?;
    Ok(())
}

/// Install completion script to the standard location.
pub fn run_install(shell: Option<Shell>, dry_run: bool) -> Result<()> {
    let shell = match shell {
        Some(s) => s,
        None => detect_shell()?,
    };
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    let path = completion_path(&home, shell)?;
    let (_, instructions) = shell_target(shell)?;

    if dry_run {
        println!(
            "{}",
            style("DRY RUN - No files will be modified").yellow().bold()
        );
        println!("{}", style(format!("Completion path: {}", path.display())).cyan());
        println!();
        println!("{instructions}");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        debug!("Creating parent directory: {}", parent.display());
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(&path, completion_script(shell))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} Completion script installed to {}",
        style("*").green().bold(),
        style(path.display()).cyan()
    );
    println!();
    println!("{instructions}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_paths() {
        let home = Path::new("/home/user");
        assert_eq!(
            completion_path(home, Shell::Zsh).unwrap(),
            PathBuf::from("/home/user/.zsh/completions/_issuetrend")
        );
        assert!(
            completion_path(home, Shell::Fish)
                .unwrap()
                .ends_with("issuetrend.fish")
        );
    }

    #[test]
    fn test_unsupported_shell() {
        assert!(shell_target(Shell::PowerShell).is_err());
    }

    #[test]
    fn test_completion_script_mentions_commands() {
        let script = String::from_utf8(completion_script(Shell::Bash)).unwrap();
        assert!(script.contains("issuetrend"));
        assert!(script.contains("chart"));
    }
}

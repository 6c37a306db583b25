// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::AuthStatusResult;

use super::Renderable;

impl Renderable for AuthStatusResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        if self.authenticated {
            writeln!(w, "{} Authenticated with GitHub", style("*").green().bold())?;
            if let Some(ref method) = self.method {
                writeln!(w, "  Source: {}", style(method.to_string()).cyan())?;
            }
            if let Some(kind) = self.credential_kind {
                writeln!(w, "  Credential: {}", style(kind).cyan())?;
            }
        } else {
            writeln!(
                w,
                "{} Not authenticated. Run {} or set GITHUB_TOKEN.",
                style("!").yellow().bold(),
                style("issuetrend auth login").cyan()
            )?;
        }
        writeln!(w)?;
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "## Authentication Status\n")?;
        if self.authenticated {
            writeln!(w, "**Status:** Authenticated")?;
            if let Some(ref method) = self.method {
                writeln!(w, "**Source:** {method}")?;
            }
            if let Some(kind) = self.credential_kind {
                writeln!(w, "**Credential:** {kind}")?;
            }
        } else {
            writeln!(w, "**Status:** Not authenticated")?;
        }
        Ok(())
    }
}

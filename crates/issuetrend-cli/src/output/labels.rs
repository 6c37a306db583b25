// SPDX-License-Identifier: Apache-2.0

use comfy_table::{Cell, CellAlignment};
use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::LabelsResult;

use super::{Renderable, new_table};

impl Renderable for LabelsResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(
            w,
            "{}  {} open issues  {}",
            style(self.repo.to_string()).bold(),
            style(self.open_issues).cyan(),
            style(format!("({} labels)", self.labels.len())).dim()
        )?;
        writeln!(w)?;

        if self.labels.is_empty() {
            writeln!(w, "{}", style("This repository has no labels.").yellow())?;
            return Ok(());
        }

        let mut table = new_table(ctx);
        table.set_header(vec!["Label", "Color", "Open"]);
        for label in &self.labels {
            table.add_row(vec![
                Cell::new(&label.name),
                Cell::new(format!("#{}", label.color)),
                Cell::new(label.open_issue_count).set_alignment(CellAlignment::Right),
            ]);
        }
        writeln!(w, "{table}")?;
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "## Labels: {}\n", self.repo)?;
        writeln!(w, "**Open issues:** {}\n", self.open_issues)?;
        writeln!(w, "| Label | Color | Open |")?;
        writeln!(w, "|---|---|---:|")?;
        for label in &self.labels {
            writeln!(
                w,
                "| {} | `#{}` | {} |",
                label.name, label.color, label.open_issue_count
            )?;
        }
        Ok(())
    }
}

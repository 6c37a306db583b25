// SPDX-License-Identifier: Apache-2.0

use comfy_table::{Attribute, Cell, CellAlignment};
use console::style;
use issuetrend_core::{TOTAL_LABEL, format_instant, truncate};
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::ChartResult;

use super::{Renderable, new_table};

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARKLINE_WIDTH: usize = 48;

/// Legend text with the synthetic total spelled out.
fn display_name(label: &str) -> String {
    truncate(&label.replace(TOTAL_LABEL, "total"), 32)
}

/// Unicode block sparkline of `data`, sampled evenly down to `width` points.
fn sparkline(data: &[u64], width: usize) -> String {
    if data.is_empty() || width == 0 {
        return String::new();
    }

    let samples: Vec<u64> = if data.len() <= width {
        data.to_vec()
    } else {
        let span = (width - 1).max(1);
        (0..width)
            .map(|i| data[i * (data.len() - 1) / span])
            .collect()
    };

    let max = samples.iter().copied().max().unwrap_or(0);
    samples
        .iter()
        .map(|&value| {
            if max == 0 {
                BLOCKS[0]
            } else {
                let level = value * (BLOCKS.len() as u64 - 1) / max;
                BLOCKS[usize::try_from(level).unwrap_or(BLOCKS.len() - 1)]
            }
        })
        .collect()
}

impl ChartResult {
    /// Index of the first timeline entry listed in tables.
    fn first_row(&self) -> usize {
        self.chart.timeline.len().saturating_sub(self.rows)
    }
}

impl Renderable for ChartResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        let chart = &self.chart;
        writeln!(w)?;
        writeln!(
            w,
            "{}  {} open issues  {}",
            style(chart.repo.to_string()).bold(),
            style(chart.open_issues).cyan(),
            style(format!("(mode: {})", chart.mode)).dim()
        )?;
        writeln!(w)?;

        if chart.series.is_empty() {
            writeln!(w, "{}", style("No labels selected.").yellow())?;
            return Ok(());
        }

        let name_width = chart
            .series
            .iter()
            .map(|s| display_name(&s.label).chars().count())
            .max()
            .unwrap_or(0);
        for series in &chart.series {
            let latest = series.data.last().copied().unwrap_or(0);
            let peak = series.data.iter().copied().max().unwrap_or(0);
            writeln!(
                w,
                "  {:<name_width$}  {}  now {}  peak {}",
                display_name(&series.label),
                style(sparkline(&series.data, SPARKLINE_WIDTH)).cyan(),
                latest,
                peak
            )?;
        }
        writeln!(w)?;

        let mut table = new_table(ctx);
        let mut header = vec![Cell::new("Date").add_attribute(Attribute::Bold)];
        header.extend(
            chart
                .series
                .iter()
                .map(|s| Cell::new(display_name(&s.label)).add_attribute(Attribute::Bold)),
        );
        table.set_header(header);

        let instants = chart.timeline.instants();
        for index in self.first_row()..instants.len() {
            let mut row = vec![Cell::new(format_instant(&instants[index]))];
            row.extend(chart.series.iter().map(|s| {
                Cell::new(s.data[index]).set_alignment(CellAlignment::Right)
            }));
            table.add_row(row);
        }
        writeln!(w, "{table}")?;
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let chart = &self.chart;
        writeln!(w, "## Open issues: {}\n", chart.repo)?;
        writeln!(
            w,
            "**Open now:** {}  \n**Mode:** {}\n",
            chart.open_issues, chart.mode
        )?;

        if chart.series.is_empty() {
            writeln!(w, "_No labels selected._")?;
            return Ok(());
        }

        let names: Vec<String> = chart.series.iter().map(|s| display_name(&s.label)).collect();
        writeln!(w, "| Date | {} |", names.join(" | "))?;
        writeln!(w, "|---|{}", "---:|".repeat(names.len()))?;

        let instants = chart.timeline.instants();
        for index in self.first_row()..instants.len() {
            let values: Vec<String> = chart
                .series
                .iter()
                .map(|s| s.data[index].to_string())
                .collect();
            writeln!(w, "| {} | {} |", format_instant(&instants[index]), values.join(" | "))?;
        }
        Ok(())
    }
}

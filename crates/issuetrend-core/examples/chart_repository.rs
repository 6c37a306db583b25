// SPDX-License-Identifier: Apache-2.0

//! Fetch a repository and print its open issue counts per label.
//!
//! Run with: `GITHUB_TOKEN=... cargo run --example chart_repository -p issuetrend-core -- OWNER/REPO bug`

use issuetrend_core::{
    AppConfig, SelectionAction, Session, StaticTokenProvider, load_repository, parse_repo_input,
};
use secrecy::SecretString;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let target = parse_repo_input(&args.next().unwrap_or_else(|| "octocat/Hello-World".to_string()))?;
    let provider = StaticTokenProvider(std::env::var("GITHUB_TOKEN").ok().map(SecretString::from));

    let mut session = Session::new();
    let snapshot = load_repository(
        &mut session,
        &provider,
        &target,
        &AppConfig::default(),
        false,
        &|percent| eprintln!("{percent}%"),
    )
    .await?;

    for label in args {
        session.select(SelectionAction::Toggle(label));
    }

    println!("{}: {} open issues", snapshot.repo(), snapshot.open_issue_count());
    if let Some(chart) = session.chart() {
        for series in &chart.series {
            println!(
                "  {:<24} now {:>5}  peak {:>5}",
                series.label,
                series.data.last().copied().unwrap_or(0),
                series.data.iter().copied().max().unwrap_or(0)
            );
        }
    }
    Ok(())
}

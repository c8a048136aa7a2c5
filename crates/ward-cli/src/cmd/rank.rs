//! `wd rank`: recompute and print the department scoreboard.

use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use crate::output::{OutputMode, render};
use tracing::warn;
use ward_core::watch::SnapshotFeed;
use ward_rank::{DepartmentScore, scoreboard};

use super::open_project;

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Only print the top N departments.
    #[arg(long)]
    pub top: Option<usize>,

    /// Keep polling the store and re-print the scoreboard when issues
    /// change (interval from config `rank.rescore_interval_secs`).
    #[arg(long)]
    pub watch: bool,
}

#[derive(Debug, Serialize)]
struct RankOutput {
    rows: Vec<DepartmentScore>,
}

/// Handle `wd rank`.
///
/// # Errors
///
/// Fails when the project cannot be opened. Degraded store reads do not
/// fail the command; they produce partial aggregates.
pub fn run_rank(args: &RankArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = open_project(project_root, output)?;

    if args.watch {
        let interval = Duration::from_secs(project.config.rank.rescore_interval_secs);
        let mut feed = SnapshotFeed::new(project.engine.store());
        let mut first = true;
        loop {
            match feed.poll() {
                Ok(batch) => {
                    if first || !batch.is_empty() {
                        print_scoreboard(args, output, project.engine.store())?;
                        first = false;
                    }
                }
                Err(err) => warn!(error = %err, "rescore poll failed; will retry"),
            }
            std::thread::sleep(interval);
        }
    }

    print_scoreboard(args, output, project.engine.store())
}

fn print_scoreboard<S>(args: &RankArgs, output: OutputMode, store: &S) -> anyhow::Result<()>
where
    S: ward_core::store::IssueStore + ward_core::store::PostFeed,
{
    let mut rows = scoreboard(store);
    if let Some(top) = args.top {
        rows.truncate(top);
    }

    let result = RankOutput { rows };
    render(output, &result, |r, w| {
        writeln!(
            w,
            "{:<5} {:<12} {:>6} {:>9} {:>10} {:>6} {:>6}  {}",
            "RANK", "DEPT", "SCORE", "RESOLVED", "ESCALATED", "LIKES", "TREND", "BADGE"
        )?;
        for row in &r.rows {
            writeln!(
                w,
                "{:<5} {:<12} {:>6} {:>9} {:>10} {:>6} {:>6}  {}",
                row.rank,
                row.department.to_string(),
                row.score,
                row.resolved_count,
                row.escalated_count,
                row.likes_total,
                row.trend_label,
                row.badge.map_or_else(String::new, |b| b.to_string()),
            )?;
        }
        Ok(())
    })
}

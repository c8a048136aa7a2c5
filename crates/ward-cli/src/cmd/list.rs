//! `wd list`: filtered issue listings.

use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;
use std::str::FromStr;

use crate::output::{CliError, OutputMode, render, render_error};
use ward_core::model::department::Department;
use ward_core::model::issue::{EscalationStatus, Issue, Status};
use ward_core::store::{IssueFilter, IssueStore};

use super::{engine_error, open_project};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by department (id or code).
    #[arg(long)]
    pub department: Option<String>,

    /// Filter by primary status.
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by escalation status.
    #[arg(long)]
    pub escalation: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListRow {
    id: String,
    status: String,
    priority: String,
    department: String,
    title: String,
    assignee: Option<String>,
    escalation: Option<String>,
}

impl ListRow {
    fn from_issue(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            status: issue.status.to_string(),
            priority: issue.priority.to_string(),
            department: issue.department.to_string(),
            title: issue.title.clone(),
            assignee: issue.assigned_personnel.as_ref().map(|p| p.id.clone()),
            escalation: issue.escalation.as_ref().map(|e| e.status.to_string()),
        }
    }
}

fn parse_filter(args: &ListArgs, output: OutputMode) -> anyhow::Result<IssueFilter> {
    let mut filter = IssueFilter::default();
    if let Some(raw) = &args.department {
        filter.department = Some(parse_or_render(
            output,
            raw,
            "Use a department id (water, swm, ...) or code (WSS, SWM, ...)",
            "invalid_department",
        )?);
    }
    if let Some(raw) = &args.status {
        filter.status = Some(parse_or_render::<Status>(
            output,
            raw,
            "Use one of: pending, assign, pending-review, resolved, reopened",
            "invalid_status",
        )?);
    }
    if let Some(raw) = &args.escalation {
        filter.escalation = Some(parse_or_render::<EscalationStatus>(
            output,
            raw,
            "Use one of: pending, approved, rejected",
            "invalid_escalation_status",
        )?);
    }
    Ok(filter)
}

fn parse_or_render<T>(
    output: OutputMode,
    raw: &str,
    suggestion: &str,
    code: &str,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(raw).map_err(|err| {
        render_error(output, &CliError::with_details(err.to_string(), suggestion, code)).ok();
        anyhow::anyhow!("{err}")
    })
}

/// Handle `wd list`.
///
/// # Errors
///
/// Fails on filter parse errors, missing project, or store failures.
pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let filter = parse_filter(args, output)?;
    let project = open_project(project_root, output)?;
    let issues = project
        .engine
        .store()
        .query_issues(&filter)
        .map_err(|err| engine_error(output, &err))?;

    let rows: Vec<ListRow> = issues.iter().map(ListRow::from_issue).collect();
    render(output, &rows, |rows, w| {
        if rows.is_empty() {
            return writeln!(w, "no issues match");
        }
        for row in rows {
            writeln!(
                w,
                "{}  {:<14} {:<8} {:<12} {}{}",
                row.id,
                row.status,
                row.priority,
                row.department,
                row.title,
                row.escalation
                    .as_ref()
                    .map_or_else(String::new, |esc| format!("  [escalation: {esc}]")),
            )?;
        }
        Ok(())
    })
}

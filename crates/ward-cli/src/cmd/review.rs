//! `wd approve` / `wd reject`: conclude the open proof review.

use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use crate::output::{OutputMode, render, render_error};
use crate::validate;

use super::{engine_error, open_project, require_actor};

#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Issue ID whose proof review to approve.
    pub issue: String,
}

#[derive(Args, Debug)]
pub struct RejectArgs {
    /// Issue ID whose proof review to reject.
    pub issue: String,
}

#[derive(Debug, Serialize)]
struct ReviewOutput {
    ok: bool,
    id: String,
    status: String,
    verdict: String,
}

fn run_review(
    issue_id: &str,
    approve: bool,
    agent_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let reviewer = require_actor(agent_flag, output)?;
    if let Err(err) = validate::validate_issue_id(issue_id) {
        render_error(output, &err.to_cli_error())?;
        anyhow::bail!(err.reason);
    }

    let project = open_project(project_root, output)?;
    let issue = if approve {
        project.engine.approve_proof(issue_id, &reviewer)
    } else {
        project.engine.reject_proof(issue_id, &reviewer)
    }
    .map_err(|err| engine_error(output, &err))?;

    let result = ReviewOutput {
        ok: true,
        id: issue.id.clone(),
        status: issue.status.to_string(),
        verdict: if approve { "approved" } else { "rejected" }.to_string(),
    };
    render(output, &result, |r, w| match r.verdict.as_str() {
        "approved" => writeln!(w, "✓ {}: resolved", r.id),
        _ => writeln!(w, "✓ {}: proof rejected, back to work", r.id),
    })
}

/// Handle `wd approve`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or engine refusals
/// (`AlreadyApproved`, `InvalidTransition`, `ConflictingTransition`).
pub fn run_approve(
    args: &ApproveArgs,
    agent_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    run_review(&args.issue, true, agent_flag, output, project_root)
}

/// Handle `wd reject`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or engine refusals.
pub fn run_reject(
    args: &RejectArgs,
    agent_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    run_review(&args.issue, false, agent_flag, output, project_root)
}

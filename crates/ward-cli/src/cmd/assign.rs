//! `wd assign`: hand an unassigned issue to an active worker.

use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use crate::output::{OutputMode, render, render_error};
use crate::validate;

use super::{engine_error, open_project, require_actor};

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Issue ID to assign.
    pub issue: String,

    /// Worker to assign it to.
    #[arg(value_name = "WORKER")]
    pub worker: String,
}

#[derive(Debug, Serialize)]
struct AssignOutput {
    ok: bool,
    id: String,
    status: String,
    worker: String,
}

/// Handle `wd assign`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or engine refusals
/// (`AlreadyAssigned`, `WorkerUnavailable`, ...).
pub fn run_assign(
    args: &AssignArgs,
    agent_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(agent_flag, output)?;
    for check in [
        validate::validate_issue_id(&args.issue),
        validate::validate_agent(&args.worker),
    ] {
        if let Err(err) = check {
            render_error(output, &err.to_cli_error())?;
            anyhow::bail!(err.reason);
        }
    }

    let project = open_project(project_root, output)?;
    let issue = project
        .engine
        .assign_task(&args.issue, &args.worker, &actor)
        .map_err(|err| engine_error(output, &err))?;

    let result = AssignOutput {
        ok: true,
        id: issue.id.clone(),
        status: issue.status.to_string(),
        worker: args.worker.clone(),
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ {}: assigned to {}", r.id, r.worker)
    })
}

//! `wd reopen`: send a resolved issue back to active work.

use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use crate::output::{OutputMode, render, render_error};
use crate::validate;

use super::{engine_error, open_project, require_actor};

#[derive(Args, Debug)]
pub struct ReopenArgs {
    /// Resolved issue ID to reopen.
    pub issue: String,
}

#[derive(Debug, Serialize)]
struct ReopenOutput {
    ok: bool,
    id: String,
    status: String,
}

/// Handle `wd reopen`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or engine refusals.
pub fn run_reopen(
    args: &ReopenArgs,
    agent_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(agent_flag, output)?;
    if let Err(err) = validate::validate_issue_id(&args.issue) {
        render_error(output, &err.to_cli_error())?;
        anyhow::bail!(err.reason);
    }

    let project = open_project(project_root, output)?;
    let issue = project
        .engine
        .reopen(&args.issue, &actor)
        .map_err(|err| engine_error(output, &err))?;

    let result = ReopenOutput {
        ok: true,
        id: issue.id.clone(),
        status: issue.status.to_string(),
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ {}: reopened, back in {}", r.id, r.status)
    })
}

//! `wd escalate` and `wd escalation approve|reject`: the higher-authority
//! sign-off workflow.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use crate::output::{OutputMode, render, render_error};
use crate::validate;

use super::{engine_error, open_project, require_actor};

#[derive(Args, Debug)]
pub struct EscalateArgs {
    /// Issue ID to escalate.
    pub issue: String,

    /// Why higher-authority attention is required.
    #[arg(long)]
    pub reason: String,
}

#[derive(Subcommand, Debug)]
pub enum EscalationCommand {
    /// Approve the pending escalation (discloses and notifies the citizen).
    Approve {
        /// Issue ID with a pending escalation.
        issue: String,
    },
    /// Reject the pending escalation.
    Reject {
        /// Issue ID with a pending escalation.
        issue: String,
    },
}

#[derive(Debug, Serialize)]
struct EscalationOutput {
    ok: bool,
    id: String,
    status: String,
    escalation: String,
}

/// Handle `wd escalate`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or engine refusals (a
/// pending escalation already exists).
pub fn run_escalate(
    args: &EscalateArgs,
    agent_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(agent_flag, output)?;
    for check in [
        validate::validate_issue_id(&args.issue),
        validate::validate_reason(&args.reason),
    ] {
        if let Err(err) = check {
            render_error(output, &err.to_cli_error())?;
            anyhow::bail!(err.reason);
        }
    }

    let project = open_project(project_root, output)?;
    let issue = project
        .engine
        .escalate(&args.issue, &args.reason, &actor)
        .map_err(|err| engine_error(output, &err))?;

    let result = EscalationOutput {
        ok: true,
        id: issue.id.clone(),
        status: issue.status.to_string(),
        escalation: escalation_status(&issue),
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ {}: escalated, awaiting sign-off", r.id)
    })
}

/// Handle `wd escalation approve|reject`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or engine refusals (no
/// pending escalation).
pub fn run_escalation(
    command: &EscalationCommand,
    agent_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let approver = require_actor(agent_flag, output)?;
    let (issue_id, approve) = match command {
        EscalationCommand::Approve { issue } => (issue, true),
        EscalationCommand::Reject { issue } => (issue, false),
    };
    if let Err(err) = validate::validate_issue_id(issue_id) {
        render_error(output, &err.to_cli_error())?;
        anyhow::bail!(err.reason);
    }

    let project = open_project(project_root, output)?;
    let issue = if approve {
        project.engine.approve_escalation(issue_id, &approver)
    } else {
        project.engine.reject_escalation(issue_id, &approver)
    }
    .map_err(|err| engine_error(output, &err))?;

    let result = EscalationOutput {
        ok: true,
        id: issue.id.clone(),
        status: issue.status.to_string(),
        escalation: escalation_status(&issue),
    };
    render(output, &result, |r, w| {
        writeln!(
            w,
            "✓ {}: escalation {}, issue back in {}",
            r.id, r.escalation, r.status
        )
    })
}

fn escalation_status(issue: &ward_core::model::issue::Issue) -> String {
    issue
        .escalation
        .as_ref()
        .map_or_else(|| "none".to_string(), |esc| esc.status.to_string())
}

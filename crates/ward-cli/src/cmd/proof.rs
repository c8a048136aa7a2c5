//! `wd proof`: submit proof-of-work evidence for an assigned issue.

use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use crate::output::{OutputMode, render, render_error};
use crate::validate;
use ward_core::model::issue::ProofOfWork;

use super::{engine_error, open_project, require_actor};

#[derive(Args, Debug)]
pub struct ProofArgs {
    /// Issue ID the evidence belongs to.
    pub issue: String,

    /// Media URL of the evidence (photo, video, report).
    #[arg(long)]
    pub media: String,

    /// Free-text work summary.
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Where the evidence was captured.
    #[arg(long)]
    pub location: Option<String>,

    /// Mark the evidence as geo-verified at the capture site.
    #[arg(long)]
    pub geo_verified: bool,
}

#[derive(Debug, Serialize)]
struct ProofOutput {
    ok: bool,
    id: String,
    status: String,
    proofs: usize,
}

/// Handle `wd proof`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or engine refusals
/// (`ReviewInProgress`, `InvalidTransition`).
pub fn run_proof(
    args: &ProofArgs,
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
        .submit_proof(
            &args.issue,
            ProofOfWork {
                media_url: args.media.clone(),
                timestamp: Utc::now(),
                location: args.location.clone(),
                geo_verified: args.geo_verified,
                notes: args.notes.clone(),
            },
            &actor,
        )
        .map_err(|err| engine_error(output, &err))?;

    let result = ProofOutput {
        ok: true,
        id: issue.id.clone(),
        status: issue.status.to_string(),
        proofs: issue.proof_of_work.len(),
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ {}: proof submitted, awaiting review", r.id)
    })
}

//! `wd show`: full details for one issue.

use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use crate::output::{OutputMode, render, render_error};
use crate::validate;
use ward_core::model::issue::Issue;
use ward_core::store::IssueStore;

use super::{engine_error, open_project};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Issue ID to show.
    pub issue: String,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    #[serde(flatten)]
    issue: Issue,
}

/// Handle `wd show`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or an unknown issue.
pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    if let Err(err) = validate::validate_issue_id(&args.issue) {
        render_error(output, &err.to_cli_error())?;
        anyhow::bail!(err.reason);
    }

    let project = open_project(project_root, output)?;
    let issue = project
        .engine
        .store()
        .get_issue(&args.issue)
        .map_err(|err| engine_error(output, &err))?;

    let result = ShowOutput { issue };
    render(output, &result, |r, w| {
        let issue = &r.issue;
        writeln!(w, "{}  [{}] {}", issue.id, issue.status, issue.title)?;
        writeln!(
            w,
            "  department: {}  priority: {}",
            issue.department.name(),
            issue.priority
        )?;
        if let Some(location) = &issue.location {
            writeln!(w, "  location:   {location}")?;
        }
        if !issue.reported_by.is_empty() {
            writeln!(w, "  reported:   {}", issue.reported_by)?;
        }
        match &issue.assigned_personnel {
            Some(personnel) => writeln!(
                w,
                "  assignee:   {} ({})",
                personnel.name, personnel.id
            )?,
            None => writeln!(w, "  assignee:   unassigned")?,
        }
        for proof in &issue.proof_of_work {
            writeln!(
                w,
                "  proof:      {} geo_verified={}",
                proof.media_url, proof.geo_verified
            )?;
        }
        if let Some(review) = &issue.proof_review {
            writeln!(
                w,
                "  review:     {} by {}",
                review.status, review.reviewed_by
            )?;
        }
        if let Some(escalation) = &issue.escalation {
            writeln!(
                w,
                "  escalation: {} ({})",
                escalation.status, escalation.reason
            )?;
        }
        if let Some(rating) = issue.public_ratings.work {
            writeln!(w, "  work rating: {:.1}/5", rating.average)?;
        }
        for entry in &issue.audit {
            writeln!(
                w,
                "  audit:      {} at {} by {}",
                entry.status,
                entry.timestamp.to_rfc3339(),
                entry.updated_by
            )?;
        }
        Ok(())
    })
}

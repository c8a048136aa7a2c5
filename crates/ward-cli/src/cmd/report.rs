//! `wd report`: citizen intake: create the feed post and the issue.

use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;
use std::str::FromStr;

use crate::output::{CliError, OutputMode, render, render_error};
use crate::validate;
use ward_core::engine::lifecycle::ReportDraft;
use ward_core::model::department::Department;
use ward_core::model::issue::Priority;
use ward_core::model::post::{Post, PostStatus};
use ward_core::store::PostFeed;

use super::{engine_error, open_project, require_actor};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Short description of the problem.
    #[arg(long)]
    pub title: String,

    /// Longer free-text description.
    #[arg(long, default_value = "")]
    pub description: String,

    /// Department the issue belongs to (id or code, e.g. `water` or `WSS`).
    #[arg(long)]
    pub department: Option<String>,

    /// Priority at creation; immutable for scoring.
    #[arg(long, default_value = "medium")]
    pub priority: String,

    /// Where the problem is.
    #[arg(long)]
    pub location: Option<String>,

    /// Skip creating the citizen feed post (no status mirroring).
    #[arg(long)]
    pub no_post: bool,
}

#[derive(Debug, Serialize)]
struct ReportOutput {
    ok: bool,
    id: String,
    status: String,
    department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_id: Option<i64>,
}

/// Handle `wd report`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or store failures.
pub fn run_report(
    args: &ReportArgs,
    agent_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(agent_flag, output)?;
    if let Err(err) = validate::validate_title(&args.title) {
        render_error(output, &err.to_cli_error())?;
        anyhow::bail!(err.reason);
    }

    let project = open_project(project_root, output)?;

    let department = match resolve_department(args.department.as_deref(), &project.config) {
        Ok(department) => department,
        Err(err) => {
            render_error(output, &err)?;
            anyhow::bail!(err.message);
        }
    };
    let priority = match Priority::from_str(&args.priority) {
        Ok(priority) => priority,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    err.to_string(),
                    "Use one of: critical, high, medium, low",
                    "invalid_priority",
                ),
            )?;
            anyhow::bail!(err);
        }
    };

    let original_post_id = if args.no_post {
        None
    } else {
        let post_id = project
            .engine
            .store()
            .create_post(&Post {
                id: 0,
                author: actor.clone(),
                owner: actor.clone(),
                body: args.title.clone(),
                status: PostStatus::Reported,
                issue_id: None,
                likes: 0,
                is_resolved: false,
                is_escalated: false,
                rating_work_avg: None,
                rating_escalation_avg: None,
                created_at: Utc::now(),
            })
            .map_err(|err| engine_error(output, &err))?;
        Some(post_id)
    };

    let issue = project
        .engine
        .report(ReportDraft {
            title: args.title.clone(),
            description: args.description.clone(),
            department,
            priority,
            location: args.location.clone(),
            reported_by: actor,
            original_post_id,
        })
        .map_err(|err| engine_error(output, &err))?;

    let result = ReportOutput {
        ok: true,
        id: issue.id.clone(),
        status: issue.status.to_string(),
        department: issue.department.to_string(),
        post_id: original_post_id,
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ {}: reported ({})", r.id, r.department)
    })
}

fn resolve_department(
    flag: Option<&str>,
    config: &ward_core::config::ProjectConfig,
) -> Result<Department, CliError> {
    if let Some(raw) = flag {
        return Department::from_str(raw).map_err(|err| {
            CliError::with_details(
                err.to_string(),
                "Use a department id (water, swm, ...) or code (WSS, SWM, ...)",
                "invalid_department",
            )
        });
    }
    config.intake.default_department.ok_or_else(|| {
        CliError::with_details(
            "no department given and no default configured",
            "Pass --department, or set intake.default_department in .ward/config.toml",
            "missing_department",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{ReportArgs, run_report};
    use crate::cmd::init::{InitArgs, run_init};
    use crate::output::OutputMode;

    fn args(title: &str, department: Option<&str>) -> ReportArgs {
        ReportArgs {
            title: title.into(),
            description: String::new(),
            department: department.map(Into::into),
            priority: "high".into(),
            location: None,
            no_post: false,
        }
    }

    #[test]
    fn report_requires_a_department_without_config_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_init(&InitArgs { force: false }, OutputMode::Json, dir.path()).expect("init");

        let err = run_report(
            &args("Pothole on Main Street", None),
            Some("jane"),
            OutputMode::Json,
            dir.path(),
        )
        .expect_err("missing department");
        assert!(err.to_string().contains("no department"));
    }

    #[test]
    fn report_accepts_codes_and_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_init(&InitArgs { force: false }, OutputMode::Json, dir.path()).expect("init");

        run_report(
            &args("Pothole on Main Street", Some("PWD")),
            Some("jane"),
            OutputMode::Json,
            dir.path(),
        )
        .expect("report by code");
        run_report(
            &args("Low water pressure", Some("water")),
            Some("jane"),
            OutputMode::Json,
            dir.path(),
        )
        .expect("report by id");
    }
}

//! `wd post`: citizen-feed engagement: inspect, like, and rate posts.

use clap::Subcommand;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use crate::output::{CliError, OutputMode, render, render_error};
use crate::validate;
use ward_core::model::post::{Post, RatingKind};
use ward_core::store::PostFeed;

use super::{engine_error, open_project};

#[derive(Subcommand, Debug)]
pub enum PostCommand {
    /// Show one post.
    Show {
        /// Post ID.
        id: i64,
    },
    /// Record a citizen like.
    Like {
        /// Post ID.
        id: i64,
    },
    /// Record a citizen rating average for one feedback channel.
    Rate {
        /// Post ID.
        id: i64,
        /// Work quality average on the 5-star scale.
        #[arg(long, conflicts_with = "escalation")]
        work: Option<f64>,
        /// Escalation validity average on the 5-star scale.
        #[arg(long)]
        escalation: Option<f64>,
    },
}

#[derive(Debug, Serialize)]
struct PostOutput {
    #[serde(flatten)]
    post: Post,
}

fn write_post(post: &Post, w: &mut dyn std::io::Write) -> std::io::Result<()> {
    writeln!(
        w,
        "post {}  [{}] by {}  likes={}",
        post.id, post.status, post.author, post.likes
    )?;
    writeln!(w, "  {}", post.body)?;
    if let Some(issue_id) = &post.issue_id {
        writeln!(w, "  issue: {issue_id}")?;
    }
    if let Some(avg) = post.rating_work_avg {
        writeln!(w, "  work rating: {avg:.1}/5")?;
    }
    if let Some(avg) = post.rating_escalation_avg {
        writeln!(w, "  escalation rating: {avg:.1}/5")?;
    }
    Ok(())
}

/// Handle `wd post ...`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or an unknown post.
pub fn run_post(
    command: &PostCommand,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = open_project(project_root, output)?;
    let store = project.engine.store();

    match command {
        PostCommand::Show { id } => {
            let post = store.get_post(*id).map_err(|err| engine_error(output, &err))?;
            render(output, &PostOutput { post }, |r, w| write_post(&r.post, w))
        }
        PostCommand::Like { id } => {
            store.like_post(*id).map_err(|err| engine_error(output, &err))?;
            let post = store.get_post(*id).map_err(|err| engine_error(output, &err))?;
            render(output, &PostOutput { post }, |r, w| {
                writeln!(w, "✓ post {}: {} likes", r.post.id, r.post.likes)
            })
        }
        PostCommand::Rate {
            id,
            work,
            escalation,
        } => {
            let (kind, value) = match (work, escalation) {
                (Some(value), None) => (RatingKind::Work, *value),
                (None, Some(value)) => (RatingKind::Escalation, *value),
                _ => {
                    let err = CliError::with_details(
                        "exactly one of --work or --escalation is required",
                        "Pass --work 4.5 or --escalation 1.5",
                        "invalid_rating",
                    );
                    render_error(output, &err)?;
                    anyhow::bail!(err.message);
                }
            };
            if let Err(err) = validate::validate_rating(value) {
                render_error(output, &err.to_cli_error())?;
                anyhow::bail!(err.reason);
            }

            store
                .rate_post(*id, kind, value)
                .map_err(|err| engine_error(output, &err))?;
            let post = store.get_post(*id).map_err(|err| engine_error(output, &err))?;
            render(output, &PostOutput { post }, |r, w| {
                writeln!(w, "✓ post {}: rating recorded", r.post.id)
            })
        }
    }
}

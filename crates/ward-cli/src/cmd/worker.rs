//! `wd worker`: register, list, and manage field workers.

use clap::Subcommand;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;
use std::str::FromStr;

use crate::output::{CliError, OutputMode, render, render_error};
use crate::validate;
use ward_core::model::department::Department;
use ward_core::model::worker::Worker;
use ward_core::store::WorkerLedger;

use super::{engine_error, open_project};

#[derive(Subcommand, Debug)]
pub enum WorkerCommand {
    /// Register a new worker (active by default).
    Add {
        /// Worker identifier, e.g. `mike.johnson`.
        id: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// Department the worker belongs to.
        #[arg(long)]
        department: String,
        /// Contact address.
        #[arg(long, default_value = "")]
        contact: String,
    },
    /// List workers with their credit counters.
    List {
        /// Filter by department (id or code).
        #[arg(long)]
        department: Option<String>,
    },
    /// Show one worker.
    Show {
        /// Worker identifier.
        id: String,
    },
    /// Stop routing new assignments to a worker.
    Deactivate {
        /// Worker identifier.
        id: String,
    },
    /// Resume routing assignments to a worker.
    Activate {
        /// Worker identifier.
        id: String,
    },
}

#[derive(Debug, Serialize)]
struct WorkerRow {
    id: String,
    name: String,
    department: String,
    active: bool,
    civic_score: i64,
    tasks_completed: u32,
    earned_badges: u8,
}

impl WorkerRow {
    fn from_worker(worker: &Worker) -> Self {
        Self {
            id: worker.id.clone(),
            name: worker.name.clone(),
            department: worker.department.to_string(),
            active: worker.active,
            civic_score: worker.civic_score,
            tasks_completed: worker.tasks_completed,
            earned_badges: worker.earned_badges,
        }
    }
}

fn write_row(row: &WorkerRow, w: &mut dyn std::io::Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{:<16} {:<20} {:<12} {:<8} score={:<6} tasks={:<4} badges={}",
        row.id,
        row.name,
        row.department,
        if row.active { "active" } else { "inactive" },
        row.civic_score,
        row.tasks_completed,
        row.earned_badges,
    )
}

/// Handle `wd worker ...`.
///
/// # Errors
///
/// Fails on validation errors, missing project, or store failures.
pub fn run_worker(
    command: &WorkerCommand,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = open_project(project_root, output)?;
    let store = project.engine.store();

    match command {
        WorkerCommand::Add {
            id,
            name,
            department,
            contact,
        } => {
            if let Err(err) = validate::validate_agent(id) {
                render_error(output, &err.to_cli_error())?;
                anyhow::bail!(err.reason);
            }
            let department = Department::from_str(department).map_err(|err| {
                render_error(
                    output,
                    &CliError::with_details(
                        err.to_string(),
                        "Use a department id (water, swm, ...) or code (WSS, SWM, ...)",
                        "invalid_department",
                    ),
                )
                .ok();
                anyhow::anyhow!("{err}")
            })?;

            let worker = Worker::new(id.clone(), name.clone(), department, contact.clone());
            store
                .create_worker(&worker)
                .map_err(|err| engine_error(output, &err))?;
            let row = WorkerRow::from_worker(&worker);
            render(output, &row, |r, w| {
                writeln!(w, "✓ registered {} ({})", r.id, r.department)
            })
        }
        WorkerCommand::List { department } => {
            let department = match department {
                Some(raw) => Some(Department::from_str(raw).map_err(|err| {
                    render_error(
                        output,
                        &CliError::with_details(
                            err.to_string(),
                            "Use a department id (water, swm, ...) or code (WSS, SWM, ...)",
                            "invalid_department",
                        ),
                    )
                    .ok();
                    anyhow::anyhow!("{err}")
                })?),
                None => None,
            };
            let workers = store
                .query_workers(department)
                .map_err(|err| engine_error(output, &err))?;
            let rows: Vec<WorkerRow> = workers.iter().map(WorkerRow::from_worker).collect();
            render(output, &rows, |rows, w| {
                if rows.is_empty() {
                    return writeln!(w, "no workers registered");
                }
                for row in rows {
                    write_row(row, w)?;
                }
                Ok(())
            })
        }
        WorkerCommand::Show { id } => {
            let worker = store
                .get_worker(id)
                .map_err(|err| engine_error(output, &err))?;
            let row = WorkerRow::from_worker(&worker);
            render(output, &row, |r, w| write_row(r, w))
        }
        WorkerCommand::Deactivate { id } | WorkerCommand::Activate { id } => {
            let active = matches!(command, WorkerCommand::Activate { .. });
            store
                .set_worker_active(id, active)
                .map_err(|err| engine_error(output, &err))?;
            let worker = store
                .get_worker(id)
                .map_err(|err| engine_error(output, &err))?;
            let row = WorkerRow::from_worker(&worker);
            render(output, &row, |r, w| {
                writeln!(
                    w,
                    "✓ {} is now {}",
                    r.id,
                    if r.active { "active" } else { "inactive" }
                )
            })
        }
    }
}

//! Command handlers, one module per subcommand group, plus shared project
//! plumbing (locating `.ward`, opening the store, resolving the actor).

pub mod assign;
pub mod completions;
pub mod escalation;
pub mod init;
pub mod list;
pub mod post;
pub mod proof;
pub mod rank;
pub mod reopen;
pub mod report;
pub mod review;
pub mod show;
pub mod worker;

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::agent;
use crate::output::{CliError, OutputMode, render_error};
use ward_core::config::ProjectConfig;
use ward_core::db::{SqliteStore, open_store};
use ward_core::engine::Engine;
use ward_core::error::WardError;

/// Directory holding the store and config, discovered by walking up.
pub const WARD_DIR: &str = ".ward";

/// Database filename inside the ward directory.
pub const DB_FILE: &str = "ward.db";

/// Config filename inside the ward directory.
pub const CONFIG_FILE: &str = "config.toml";

/// An opened ward project: engine over the SQLite store plus config.
pub struct Project {
    pub ward_dir: PathBuf,
    pub config: ProjectConfig,
    pub engine: Engine<SqliteStore>,
}

/// Walk up from `start` looking for a `.ward` directory.
#[must_use]
pub fn find_ward_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(WARD_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Open the project containing `start`, rendering a structured error when
/// none exists.
///
/// # Errors
///
/// Fails when no `.ward` directory is found or the store cannot open.
pub fn open_project(start: &Path, output: OutputMode) -> anyhow::Result<Project> {
    let Some(ward_dir) = find_ward_dir(start) else {
        let msg = "Not a ward project: .ward directory not found";
        render_error(
            output,
            &CliError::with_details(
                msg,
                "Run 'wd init' to create a new ward project",
                "not_a_project",
            ),
        )
        .ok();
        anyhow::bail!(msg);
    };

    let config = ProjectConfig::load(&ward_dir.join(CONFIG_FILE)).context("load project config")?;
    let store = open_store(&ward_dir.join(DB_FILE)).context("open ward store")?;
    let engine = Engine::new(store).with_disclosure(config.disclosure.enabled);

    Ok(Project {
        ward_dir,
        config,
        engine,
    })
}

/// Resolve the acting identity for a mutating command, rendering the
/// structured `missing_agent` error on failure.
///
/// # Errors
///
/// Fails when no identity can be resolved or it is malformed.
pub fn require_actor(agent_flag: Option<&str>, output: OutputMode) -> anyhow::Result<String> {
    let actor = match agent::require_agent(agent_flag) {
        Ok(actor) => actor,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    &err.message,
                    "Set --agent, WARD_AGENT, AGENT, or USER (interactive only)",
                    err.code,
                ),
            )?;
            anyhow::bail!(err.message);
        }
    };
    if let Err(err) = crate::validate::validate_agent(&actor) {
        render_error(output, &err.to_cli_error())?;
        anyhow::bail!(err.reason);
    }
    Ok(actor)
}

/// Render an engine error and convert it for propagation.
#[must_use]
pub fn engine_error(output: OutputMode, err: &WardError) -> anyhow::Error {
    render_error(output, &CliError::from(err)).ok();
    anyhow::anyhow!("{err}")
}

#[cfg(test)]
mod tests {
    use super::find_ward_dir;

    #[test]
    fn find_ward_dir_walks_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ward = dir.path().join(".ward");
        std::fs::create_dir_all(&ward).expect("mkdir");
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).expect("mkdir");

        assert_eq!(find_ward_dir(&nested), Some(ward));
    }

    #[test]
    fn find_ward_dir_returns_none_outside_projects() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(find_ward_dir(dir.path()), None);
    }
}

//! `wd init`: create the `.ward` directory, store, and default config.

use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

use crate::output::{OutputMode, render};
use ward_core::config::ProjectConfig;
use ward_core::db::open_store;

use super::{CONFIG_FILE, DB_FILE, WARD_DIR};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Re-initialize even if a .ward directory already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitOutput {
    ok: bool,
    ward_dir: String,
    created: bool,
}

/// Create (or reuse) the project skeleton in `project_root`.
///
/// # Errors
///
/// Fails when the directory or store cannot be created.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let ward_dir = project_root.join(WARD_DIR);
    let already = ward_dir.is_dir();
    if already && !args.force {
        let result = InitOutput {
            ok: true,
            ward_dir: ward_dir.display().to_string(),
            created: false,
        };
        return render(output, &result, |r, w| {
            writeln!(w, "ward project already initialized at {}", r.ward_dir)
        });
    }

    std::fs::create_dir_all(&ward_dir)?;
    // Opening the store runs the migrations.
    let _store = open_store(&ward_dir.join(DB_FILE))?;

    let config_path = ward_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        std::fs::write(&config_path, ProjectConfig::default().to_toml()?)?;
    }

    let result = InitOutput {
        ok: true,
        ward_dir: ward_dir.display().to_string(),
        created: !already,
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ initialized ward project at {}", r.ward_dir)
    })
}

//! `wd completions`: generate shell completion scripts.

use clap::{Args, Command};
use clap_complete::{Shell, generate};
use std::io;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to stdout.
pub fn run_completions(args: &CompletionsArgs, cmd: &mut Command) {
    let name = cmd.get_name().to_string();
    generate(args.shell, cmd, name, &mut io::stdout());
}

#![forbid(unsafe_code)]

mod agent;
mod cmd;
mod output;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ward: civic-issue lifecycle and department ranking",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Override actor identity (skips env resolution).
    #[arg(long, global = true)]
    agent: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }

    /// Get the agent flag as an `Option<&str>` for resolution.
    fn agent_flag(&self) -> Option<&str> {
        self.agent.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize a ward project",
        long_about = "Initialize a ward project (.ward directory, store, config) in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    wd init\n\n    # Emit machine-readable output\n    wd init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "File a citizen report",
        long_about = "Create a new issue in pending, plus the citizen feed post it mirrors to.",
        after_help = "EXAMPLES:\n    # Report a water issue\n    wd report --title \"Water main break on Oak Street\" --department water --priority critical\n\n    # Without a citizen feed post\n    wd report --title \"Internal inspection finding\" --department pwd --no-post"
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Assign an issue to a worker",
        long_about = "Assign an unassigned issue to an active worker and mirror the citizen post.",
        after_help = "EXAMPLES:\n    # Assign to a registered worker\n    wd assign wss-2026-k3f9 mike.johnson"
    )]
    Assign(cmd::assign::AssignArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Submit proof of work",
        long_about = "Append evidence to an assigned issue and move it under review.",
        after_help = "EXAMPLES:\n    # Photo evidence with geo verification\n    wd proof wss-2026-k3f9 --media https://media.civic.gov/proof/42.jpg --geo-verified"
    )]
    Proof(cmd::proof::ProofArgs),

    #[command(
        next_help_heading = "Review",
        about = "Approve the open proof review",
        long_about = "Approve the submitted proof: resolve the issue, credit the worker, publish a disclosure.",
        after_help = "EXAMPLES:\n    wd approve wss-2026-k3f9"
    )]
    Approve(cmd::review::ApproveArgs),

    #[command(
        next_help_heading = "Review",
        about = "Reject the open proof review",
        long_about = "Reject the submitted proof; the issue returns to active work with the same worker.",
        after_help = "EXAMPLES:\n    wd reject wss-2026-k3f9"
    )]
    Reject(cmd::review::RejectArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Reopen a resolved issue",
        long_about = "Send a resolved issue back to active work after citizen dissatisfaction.",
        after_help = "EXAMPLES:\n    wd reopen wss-2026-k3f9"
    )]
    Reopen(cmd::reopen::ReopenArgs),

    #[command(
        next_help_heading = "Escalation",
        about = "Escalate an issue",
        long_about = "Raise a higher-authority escalation against an issue, regardless of its status.",
        after_help = "EXAMPLES:\n    wd escalate wss-2026-k3f9 --reason \"Exceeds department budget limit\""
    )]
    Escalate(cmd::escalation::EscalateArgs),

    #[command(
        next_help_heading = "Escalation",
        about = "Decide a pending escalation",
        long_about = "Approve (disclose + notify) or reject the pending escalation; either way the issue returns to active work."
    )]
    Escalation {
        #[command(subcommand)]
        command: cmd::escalation::EscalationCommand,
    },

    #[command(
        next_help_heading = "Read",
        about = "Show one issue",
        long_about = "Show full details for a single issue by ID.",
        after_help = "EXAMPLES:\n    wd show wss-2026-k3f9 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "List issues",
        long_about = "List issues with optional department/status/escalation filters.",
        after_help = "EXAMPLES:\n    # Everything pending review in one department\n    wd list --department water --status pending-review\n\n    # All issues with a pending escalation\n    wd list --escalation pending"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Scoring",
        about = "Print the department scoreboard",
        long_about = "Recompute department scores from the full corpus and print the ranking.",
        after_help = "EXAMPLES:\n    wd rank\n    wd rank --top 3 --json"
    )]
    Rank(cmd::rank::RankArgs),

    #[command(
        next_help_heading = "Registry",
        about = "Manage field workers",
        long_about = "Register workers, list their credit counters, toggle availability."
    )]
    Worker {
        #[command(subcommand)]
        command: cmd::worker::WorkerCommand,
    },

    #[command(
        next_help_heading = "Feed",
        about = "Inspect and engage with feed posts",
        long_about = "Show, like, and rate citizen feed posts (ratings feed the scoring engine)."
    )]
    Post {
        #[command(subcommand)]
        command: cmd::post::PostCommand,
    },

    #[command(
        next_help_heading = "Project",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    wd completions bash\n    wd completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("WARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "ward=debug,info"
        } else {
            "ward=info,warn"
        })
    });

    let format = env::var("WARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = std::env::current_dir()?;
    let output = cli.output_mode();

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),
        Commands::Report(args) => {
            cmd::report::run_report(args, cli.agent_flag(), output, &project_root)
        }
        Commands::Assign(args) => {
            cmd::assign::run_assign(args, cli.agent_flag(), output, &project_root)
        }
        Commands::Proof(args) => {
            cmd::proof::run_proof(args, cli.agent_flag(), output, &project_root)
        }
        Commands::Approve(args) => {
            cmd::review::run_approve(args, cli.agent_flag(), output, &project_root)
        }
        Commands::Reject(args) => {
            cmd::review::run_reject(args, cli.agent_flag(), output, &project_root)
        }
        Commands::Reopen(args) => {
            cmd::reopen::run_reopen(args, cli.agent_flag(), output, &project_root)
        }
        Commands::Escalate(args) => {
            cmd::escalation::run_escalate(args, cli.agent_flag(), output, &project_root)
        }
        Commands::Escalation { command } => {
            cmd::escalation::run_escalation(command, cli.agent_flag(), output, &project_root)
        }
        Commands::Show(args) => cmd::show::run_show(args, output, &project_root),
        Commands::List(args) => cmd::list::run_list(args, output, &project_root),
        Commands::Rank(args) => cmd::rank::run_rank(args, output, &project_root),
        Commands::Worker { command } => cmd::worker::run_worker(command, output, &project_root),
        Commands::Post { command } => cmd::post::run_post(command, output, &project_root),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args, &mut Cli::command());
            Ok(())
        }
    }
}

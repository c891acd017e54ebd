mod cmd;
mod output;
mod prompt;
mod root;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "coldcall",
    about = "Build randomized cold-call lists from a course roster and emailed skip/switch requests",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from coldcall.yaml)
    #[arg(long, global = true, env = "COLDCALL_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default coldcall.yaml and create the mailbox directories
    Init,

    /// Reconcile requests and write the call list for one or both sections
    Run {
        /// Section to build (prompted for when omitted)
        #[arg(long, conflicts_with = "both")]
        section: Option<String>,

        /// Build both sections from the same set of requests
        #[arg(long)]
        both: bool,

        /// Write the call list only; leave usage, cache and mailbox alone
        #[arg(long)]
        dry_run: bool,

        /// Seed for the shuffle (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Override today's date (YYYY-MM-DD)
        #[arg(long, env = "COLDCALL_TODAY", hide = true)]
        today: Option<NaiveDate>,
    },

    /// Show settled skip/switch counts and today's pending requests
    Usage {
        /// Override today's date (YYYY-MM-DD)
        #[arg(long, env = "COLDCALL_TODAY", hide = true)]
        today: Option<NaiveDate>,
    },

    /// Inspect the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Run {
            section,
            both,
            dry_run,
            seed,
            today,
        } => cmd::run::run(
            &root,
            cmd::run::RunArgs {
                section,
                both,
                dry_run,
                seed,
                today: cmd::today_or_local(today),
            },
            cli.json,
        ),
        Commands::Usage { today } => cmd::usage::run(&root, cmd::today_or_local(today), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

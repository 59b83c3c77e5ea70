//! CLI layer: argument parsing, command dispatch, and subcommand
//! implementations.

pub mod args;
pub(crate) mod scan;

use clap::{Parser, Subcommand};

use crate::config;
use crate::error::ScanError;
use crate::git::SystemGit;
use crate::resolver::resolve_branch;

use args::{ResolveArgs, ScanArgs};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Branch-tip time series over partial git mirrors
#[derive(Parser, Debug)]
#[command(name = "git-heads", version, about, after_help = "\
Run 'git-heads <COMMAND> --help' for detailed options.\n\
The manifest lists repositories as ordered [[repos]] tables; their order\n\
is the column order of the report.")]
pub(crate) struct Cli {
    /// Log level for stderr output (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Mirror each repository and write the branch-tip time-series CSV
    Scan(ScanArgs),

    /// Resolve and print the effective branch per repository (read-only,
    /// nothing is cloned or fetched)
    Resolve(ResolveArgs),
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Scan(args) => scan::cmd_scan(args),
        Commands::Resolve(args) => cmd_resolve(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

// ─── Small commands ─────────────────────────────────────────────────

fn cmd_resolve(args: ResolveArgs) -> Result<(), ScanError> {
    let repos = config::load_repos(&args.config)?;
    let git = SystemGit;
    for spec in &repos {
        let resolved = resolve_branch(&git, spec, args.branch.as_deref(), args.strict_branches)?;
        let marker = if resolved.was_fallback { " (fallback)" } else { "" };
        println!("{}\t{}{}", resolved.repo, resolved.branch, marker);
    }
    Ok(())
}

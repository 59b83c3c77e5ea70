//! CLI argument structs for all subcommands.

use std::path::PathBuf;

use clap::Parser;

use git_heads::TimeOfDay;

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Path to the repository manifest (TOML, ordered [[repos]] tables)
    #[arg(short, long, default_value = "repos.toml")]
    pub config: PathBuf,

    /// Trailing window in days; "today" is always excluded
    #[arg(long, default_value = "30")]
    pub days: u32,

    /// Time of day to sample, HH:MM; repeatable (default: 12:00 and 23:59)
    #[arg(long = "at", value_name = "HH:MM", action = clap::ArgAction::Append)]
    pub times: Vec<TimeOfDay>,

    /// Fixed UTC offset for all instants, e.g. +02:00
    /// (default: the local offset at startup, captured once)
    #[arg(long, value_name = "OFFSET")]
    pub utc_offset: Option<String>,

    /// Default branch for repositories that declare none in the manifest
    #[arg(long)]
    pub branch: Option<String>,

    /// Fail when a requested branch is missing on a remote instead of
    /// falling back to the remote default branch
    #[arg(long)]
    pub strict_branches: bool,

    /// Mirror cache directory (default: per-user data directory)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Output CSV path (default: git_heads_last_<DAYS>_days.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Path to the repository manifest (TOML)
    #[arg(short, long, default_value = "repos.toml")]
    pub config: PathBuf,

    /// Default branch for repositories that declare none in the manifest
    #[arg(long)]
    pub branch: Option<String>,

    /// Fail when a requested branch is missing on a remote
    #[arg(long)]
    pub strict_branches: bool,
}

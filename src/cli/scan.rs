//! The scan pipeline: resolve branches, ensure mirrors, query every
//! (repository × instant) pair, write the report.
//!
//! Repositories are processed strictly in manifest order, one at a time;
//! within one repository the resolve → mirror → query sequence is ordered.
//! The dominant cost is subprocess/network latency, and sequential execution
//! keeps every mirror directory exclusively owned by one operation.

use std::path::PathBuf;

use chrono::{Local, Utc};
use tracing::info;

use crate::config;
use crate::error::ScanError;
use crate::git::SystemGit;
use crate::history::commit_at;
use crate::mirror::ensure_mirror;
use crate::resolver::resolve_branch;
use git_heads::{
    build_schedule, history_horizon, parse_utc_offset, CommitResolution, ReportRow, TimeOfDay,
};

use super::args::ScanArgs;

pub(crate) fn cmd_scan(args: ScanArgs) -> Result<(), ScanError> {
    let repos = config::load_repos(&args.config)?;

    let offset = match &args.utc_offset {
        Some(s) => parse_utc_offset(s).map_err(ScanError::Config)?,
        None => *Local::now().offset(),
    };
    let now = Utc::now().with_timezone(&offset);
    let times = effective_times(&args.times);
    let schedule = build_schedule(args.days, &times, now);
    if schedule.is_empty() {
        return Err(ScanError::Config(
            "empty schedule: --days must be at least 1".to_string(),
        ));
    }
    let horizon = history_horizon(&schedule);

    let cache_dir = args.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("git_heads_last_{}_days.csv", args.days)));

    info!(
        repos = repos.len(),
        instants = schedule.len(),
        horizon = horizon.as_deref().unwrap_or("-"),
        cache = %cache_dir.display(),
        "starting scan"
    );

    // Phase 1: every mirror ready before any history query runs.
    let git = SystemGit;
    let mut mirrors = Vec::with_capacity(repos.len());
    for spec in &repos {
        let resolved = resolve_branch(&git, spec, args.branch.as_deref(), args.strict_branches)?;
        info!(
            repo = %resolved.repo,
            branch = %resolved.branch,
            fallback = resolved.was_fallback,
            "resolved branch"
        );
        let path = ensure_mirror(&git, &cache_dir, spec, &resolved.branch, horizon.as_deref())?;
        mirrors.push((spec.name.clone(), path, resolved.branch));
    }

    // Phase 2: rows in ascending instant order, cells in manifest order.
    let mut rows = Vec::with_capacity(schedule.len());
    for instant in &schedule {
        let mut cells = Vec::with_capacity(mirrors.len());
        for (name, path, branch) in &mirrors {
            let commit = commit_at(&git, path, branch, instant)?;
            cells.push(CommitResolution {
                repo: name.clone(),
                commit,
            });
        }
        rows.push(ReportRow {
            instant: *instant,
            cells,
        });
    }

    let order: Vec<String> = repos.iter().map(|r| r.name.clone()).collect();
    crate::report::write_report(&output, &rows, &order)?;
    eprintln!(
        "Wrote {} ({} rows × {} repos)",
        output.display(),
        rows.len(),
        order.len()
    );
    Ok(())
}

/// Default production cache location: `<data-local-dir>/git-heads/mirrors`.
/// Tests should pass `--cache-dir` instead.
pub(crate) fn default_cache_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("git-heads").join("mirrors")
}

fn effective_times(times: &[TimeOfDay]) -> Vec<TimeOfDay> {
    if times.is_empty() {
        // Midday and end-of-day samples, as the report is meant to show both
        vec![
            TimeOfDay { hour: 12, minute: 0 },
            TimeOfDay { hour: 23, minute: 59 },
        ]
    } else {
        times.to_vec()
    }
}

#[cfg(test)]
mod scan_tests {
    use super::*;

    #[test]
    fn test_effective_times_default_is_noon_and_eod() {
        let times = effective_times(&[]);
        assert_eq!(times.len(), 2);
        assert_eq!((times[0].hour, times[0].minute), (12, 0));
        assert_eq!((times[1].hour, times[1].minute), (23, 59));
    }

    #[test]
    fn test_effective_times_explicit_order_kept() {
        let given: Vec<TimeOfDay> = vec!["23:59".parse().unwrap(), "06:30".parse().unwrap()];
        assert_eq!(effective_times(&given), given);
    }

    #[test]
    fn test_default_cache_dir_ends_with_mirrors() {
        assert!(default_cache_dir().ends_with("git-heads/mirrors"));
    }
}

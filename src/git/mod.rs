//! Git subprocess layer.
//!
//! All interaction with version control goes through the narrow
//! [`GitTransport`] capability so the resolver, mirror manager and history
//! query depend on an abstraction rather than on concrete `git` invocations.
//! [`SystemGit`] is the production implementation shelling out to the `git`
//! executable; a non-zero exit surfaces the subprocess stderr verbatim.

use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use crate::error::ScanError;

#[cfg(test)]
pub mod fake;

// ─── Capability interface ───────────────────────────────────────────

/// The version-control operations the scanner needs, and nothing more.
///
/// Remote queries (`remote_branch_exists`, `remote_default_branch`) are
/// read-only and transfer no objects. `commit_before` delegates the
/// "most recent commit at or before a cutoff, closest to the tip first"
/// ordering guarantee to git's own revision walk.
pub trait GitTransport {
    /// Does `refs/heads/<branch>` exist on the remote? No clone involved.
    fn remote_branch_exists(&self, url: &str, branch: &str) -> Result<bool, ScanError>;

    /// The branch the remote's symbolic HEAD points at, or `None` when the
    /// remote does not advertise one (older servers).
    fn remote_default_branch(&self, url: &str) -> Result<Option<String>, ScanError>;

    /// Partial clone of exactly one branch into `dest`: blobs filtered, no
    /// tags, history bounded below by `shallow_since` (`YYYY-MM-DD`).
    fn clone_single_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Path,
        shallow_since: Option<&str>,
    ) -> Result<(), ScanError>;

    /// Re-point `origin` in an existing mirror (configuration may change).
    fn set_remote_url(&self, dir: &Path, url: &str) -> Result<(), ScanError>;

    /// Bounded refresh fetch of exactly one branch, pruning deleted upstream
    /// refs within the fetched refspec.
    fn fetch_single_branch(
        &self,
        dir: &Path,
        branch: &str,
        shallow_since: Option<&str>,
    ) -> Result<(), ScanError>;

    /// Branch names currently tracked under `refs/remotes/origin/`
    /// (symbolic `origin/HEAD` excluded).
    fn tracked_branches(&self, dir: &Path) -> Result<Vec<String>, ScanError>;

    /// Most recent commit on `ref_name` whose timestamp is at or before
    /// `cutoff` (an explicit-offset datetime string). `Ok(None)` when the
    /// ref's history starts after the cutoff; `Err` when the query itself
    /// fails (unreadable repo, missing ref).
    fn commit_before(
        &self,
        dir: &Path,
        ref_name: &str,
        cutoff: &str,
    ) -> Result<Option<String>, ScanError>;
}

// ─── Subprocess helpers ─────────────────────────────────────────────

/// Spawn `git <args>` (optionally inside `dir`) and wait for it.
/// Only failure to launch the binary is an error here; callers decide what
/// a non-zero exit means.
fn raw_git(dir: Option<&Path>, args: &[&str]) -> Result<Output, ScanError> {
    let mut cmd = Command::new("git");
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd.args(args);
    debug!(command = %format!("git {}", args.join(" ")), "spawning");
    cmd.output().map_err(|e| ScanError::Git {
        context: args.join(" "),
        stderr: format!("failed to execute git: {e}. Is git installed and in PATH?"),
    })
}

/// Map a non-zero exit to `ScanError::Git` carrying the subprocess stderr.
fn git_error(args: &[&str], output: &Output) -> ScanError {
    ScanError::Git {
        context: args.join(" "),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Run `git <args>` and return trimmed stdout, failing on non-zero exit.
fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<String, ScanError> {
    let output = raw_git(dir, args)?;
    if !output.status.success() {
        return Err(git_error(args, &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Extract the branch name from `ls-remote --symref <url> HEAD` output,
/// e.g. `ref: refs/heads/main\tHEAD`.
fn parse_symref(stdout: &str) -> Option<String> {
    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("ref: ") {
            let target = rest.split_whitespace().next()?;
            if let Some(branch) = target.strip_prefix("refs/heads/") {
                return Some(branch.to_string());
            }
        }
    }
    None
}

// ─── Production implementation ──────────────────────────────────────

/// `GitTransport` backed by the `git` executable in `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl GitTransport for SystemGit {
    fn remote_branch_exists(&self, url: &str, branch: &str) -> Result<bool, ScanError> {
        let refspec = format!("refs/heads/{branch}");
        let args = ["ls-remote", "--exit-code", "--heads", url, refspec.as_str()];
        let output = raw_git(None, &args)?;
        if output.status.success() {
            return Ok(true);
        }
        // --exit-code uses status 2 for "no matching refs"; anything else is
        // a transport failure (unreachable remote, auth).
        if output.status.code() == Some(2) {
            return Ok(false);
        }
        Err(git_error(&args, &output))
    }

    fn remote_default_branch(&self, url: &str) -> Result<Option<String>, ScanError> {
        let stdout = run_git(None, &["ls-remote", "--symref", url, "HEAD"])?;
        Ok(parse_symref(&stdout))
    }

    fn clone_single_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Path,
        shallow_since: Option<&str>,
    ) -> Result<(), ScanError> {
        let dest = dest.to_string_lossy();
        let mut args = vec![
            "clone",
            "--single-branch",
            "--branch",
            branch,
            "--filter=blob:none",
            "--no-tags",
        ];
        let since;
        if let Some(horizon) = shallow_since {
            since = format!("--shallow-since={horizon}");
            args.push(&since);
        }
        args.push(url);
        args.push(&dest);
        run_git(None, &args)?;
        Ok(())
    }

    fn set_remote_url(&self, dir: &Path, url: &str) -> Result<(), ScanError> {
        run_git(Some(dir), &["remote", "set-url", "origin", url])?;
        Ok(())
    }

    fn fetch_single_branch(
        &self,
        dir: &Path,
        branch: &str,
        shallow_since: Option<&str>,
    ) -> Result<(), ScanError> {
        let refspec = format!("+refs/heads/{branch}:refs/remotes/origin/{branch}");
        let mut args = vec!["fetch", "--no-tags", "--prune", "--filter=blob:none"];
        let since;
        if let Some(horizon) = shallow_since {
            since = format!("--shallow-since={horizon}");
            args.push(&since);
        }
        args.push("origin");
        args.push(&refspec);
        run_git(Some(dir), &args)?;
        Ok(())
    }

    fn tracked_branches(&self, dir: &Path) -> Result<Vec<String>, ScanError> {
        let stdout = run_git(
            Some(dir),
            &[
                "for-each-ref",
                "--format=%(refname:short)",
                "refs/remotes/origin",
            ],
        )?;
        Ok(stdout
            .lines()
            .filter_map(|line| line.trim().strip_prefix("origin/"))
            .filter(|name| *name != "HEAD" && !name.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn commit_before(
        &self,
        dir: &Path,
        ref_name: &str,
        cutoff: &str,
    ) -> Result<Option<String>, ScanError> {
        let before = format!("--before={cutoff}");
        let stdout = run_git(Some(dir), &["rev-list", "-1", &before, ref_name])?;
        if stdout.is_empty() {
            // The ref exists but has no commits at or before the cutoff.
            return Ok(None);
        }
        Ok(Some(stdout))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

//! Local mirror management: one partial, single-branch clone per repository
//! under the cache directory, refreshed with a bounded fetch on every run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ScanError;
use crate::git::GitTransport;
use git_heads::RepoSpec;

/// Ensure a valid mirror of `branch` exists for this repository and is
/// freshly fetched. Returns the mirror path.
///
/// Transferred history is bounded below by `shallow_since` (`YYYY-MM-DD`) and
/// blob content is filtered; the mirror never needs file contents. Calling
/// this twice in one run is a no-op apart from the second refresh fetch.
pub fn ensure_mirror<G: GitTransport>(
    git: &G,
    cache_dir: &Path,
    spec: &RepoSpec,
    branch: &str,
    shallow_since: Option<&str>,
) -> Result<PathBuf, ScanError> {
    let mirror = cache_dir.join(&spec.name);

    if mirror.exists() {
        validate_existing(git, &mirror, spec, branch)?;
        git.set_remote_url(&mirror, &spec.url)?;
        debug!(repo = %spec.name, branch, "refreshing existing mirror");
    } else {
        fs::create_dir_all(cache_dir)?;
        info!(repo = %spec.name, branch, path = %mirror.display(), "creating mirror");
        git.clone_single_branch(&spec.url, branch, &mirror, shallow_since)?;
    }

    // Refresh even right after a clone: the fetch also establishes the
    // remote-tracking ref layout the history queries rely on.
    git.fetch_single_branch(&mirror, branch, shallow_since)?;
    Ok(mirror)
}

/// An existing path must be a git repository tracking the same branch.
/// Anything else is a configuration conflict, never silently repaired.
fn validate_existing<G: GitTransport>(
    git: &G,
    mirror: &Path,
    spec: &RepoSpec,
    branch: &str,
) -> Result<(), ScanError> {
    if !mirror.join(".git").exists() {
        return Err(ScanError::CorruptMirror {
            path: mirror.display().to_string(),
        });
    }
    let tracked = git.tracked_branches(mirror)?;
    if !tracked.is_empty() && !tracked.iter().any(|b| b == branch) {
        return Err(ScanError::BranchConflict {
            repo: spec.name.clone(),
            tracked: tracked.join(", "),
            requested: branch.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod mirror_tests {
    use super::*;
    use crate::git::fake::FakeGit;
    use tempfile::TempDir;

    fn spec(name: &str) -> RepoSpec {
        RepoSpec {
            name: name.to_string(),
            url: "https://example.com/r.git".to_string(),
            branch: None,
        }
    }

    #[test]
    fn test_first_run_clones_then_fetches() {
        let cache = TempDir::new().unwrap();
        let git = FakeGit::new();
        let mirror =
            ensure_mirror(&git, cache.path(), &spec("r"), "main", Some("2026-07-01")).unwrap();
        assert_eq!(mirror, cache.path().join("r"));
        assert!(mirror.join(".git").exists());

        let calls = git.calls.borrow();
        assert!(calls[0].starts_with("clone"), "first call must be the clone: {calls:?}");
        assert!(calls[0].contains("since=2026-07-01"));
        assert!(calls[1].starts_with("fetch"));
    }

    #[test]
    fn test_second_run_repoints_and_fetches_only() {
        let cache = TempDir::new().unwrap();
        let git = FakeGit::new();
        ensure_mirror(&git, cache.path(), &spec("r"), "main", None).unwrap();
        let calls_after_first = git.calls.borrow().len();

        let mirror = ensure_mirror(&git, cache.path(), &spec("r"), "main", None).unwrap();
        assert_eq!(mirror, cache.path().join("r"));

        let calls = git.calls.borrow();
        let second_run = &calls[calls_after_first..];
        assert!(
            second_run.iter().all(|c| !c.starts_with("clone")),
            "idempotent rerun must not clone again: {second_run:?}"
        );
        assert!(second_run.iter().any(|c| c.starts_with("set-url")));
        assert!(second_run.iter().any(|c| c.starts_with("fetch")));
    }

    #[test]
    fn test_existing_non_repo_path_is_corrupt_not_recreated() {
        let cache = TempDir::new().unwrap();
        fs::create_dir_all(cache.path().join("r")).unwrap();
        let git = FakeGit::new();
        let result = ensure_mirror(&git, cache.path(), &spec("r"), "main", None);
        assert!(matches!(result, Err(ScanError::CorruptMirror { .. })));
        assert!(git.no_transfers(), "a corrupt path must fail before any transfer");
    }

    #[test]
    fn test_branch_switch_is_a_conflict() {
        let cache = TempDir::new().unwrap();
        let mirror = cache.path().join("r");
        fs::create_dir_all(mirror.join(".git")).unwrap();
        let git = FakeGit::new().with_tracked(&mirror, "stable31");

        let result = ensure_mirror(&git, cache.path(), &spec("r"), "stable32", None);
        assert!(matches!(
            result,
            Err(ScanError::BranchConflict { ref tracked, ref requested, .. })
                if tracked == "stable31" && requested == "stable32"
        ));
        assert!(git.no_transfers());
    }

    #[test]
    fn test_transport_failure_is_fatal() {
        let cache = TempDir::new().unwrap();
        let mut git = FakeGit::new();
        git.fail_fetch = true;
        let result = ensure_mirror(&git, cache.path(), &spec("r"), "main", None);
        assert!(matches!(result, Err(ScanError::Git { .. })));
    }
}

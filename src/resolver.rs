//! Remote branch resolution: decide which branch a repository will track
//! before anything is cloned or fetched.
//!
//! All remote queries here are read-only ref listings; no objects transfer.

use tracing::warn;

use crate::error::ScanError;
use crate::git::GitTransport;
use git_heads::{RepoSpec, ResolvedBranch};

/// Conventional default-branch candidates, probed in order when a remote
/// does not advertise a symbolic HEAD.
pub const FALLBACK_BRANCHES: &[&str] = &["main", "master"];

/// Resolve the branch to track for one repository.
///
/// The per-repo manifest branch wins over `cli_default`. A requested branch
/// that exists on the remote is used as-is. A missing requested branch is
/// fatal under `strict`; otherwise the remote's default branch takes over
/// (with a warning). With no request at all, the default branch is used.
pub fn resolve_branch<G: GitTransport>(
    git: &G,
    spec: &RepoSpec,
    cli_default: Option<&str>,
    strict: bool,
) -> Result<ResolvedBranch, ScanError> {
    let requested = spec.branch.as_deref().or(cli_default);

    if let Some(branch) = requested {
        if git.remote_branch_exists(&spec.url, branch)? {
            return Ok(ResolvedBranch {
                repo: spec.name.clone(),
                branch: branch.to_string(),
                was_fallback: false,
            });
        }
        if strict {
            return Err(ScanError::BranchNotFound {
                repo: spec.name.clone(),
                branch: branch.to_string(),
            });
        }
        warn!(
            repo = %spec.name,
            branch,
            "requested branch does not exist on remote, falling back to default branch"
        );
        let fallback = default_branch(git, spec)?;
        return Ok(ResolvedBranch {
            repo: spec.name.clone(),
            branch: fallback,
            was_fallback: true,
        });
    }

    let branch = default_branch(git, spec)?;
    Ok(ResolvedBranch {
        repo: spec.name.clone(),
        branch,
        was_fallback: false,
    })
}

/// The remote's default branch: symbolic HEAD if advertised, otherwise the
/// first existing candidate from `FALLBACK_BRANCHES`.
fn default_branch<G: GitTransport>(git: &G, spec: &RepoSpec) -> Result<String, ScanError> {
    if let Some(branch) = git.remote_default_branch(&spec.url)? {
        return Ok(branch);
    }
    for candidate in FALLBACK_BRANCHES {
        if git.remote_branch_exists(&spec.url, candidate)? {
            return Ok((*candidate).to_string());
        }
    }
    Err(ScanError::NoDefaultBranch {
        repo: spec.name.clone(),
    })
}

//! Repository manifest loading and validation.
//!
//! The manifest is an ordered TOML array of tables; declaration order is the
//! column order of the final report. It is loaded once at process start and
//! threaded through the pipeline — components never read ambient state.
//!
//! ```toml
//! [[repos]]
//! name = "server"
//! url = "https://github.com/nextcloud/server.git"
//! branch = "stable32"
//!
//! [[repos]]
//! name = "calendar"
//! url = "https://github.com/nextcloud/calendar.git"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ScanError;
use git_heads::RepoSpec;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    repos: Vec<RepoSpec>,
}

/// Load and validate the repository manifest.
///
/// Order is preserved. Fails on: unreadable file, TOML syntax errors, empty
/// repo list, duplicate names, empty urls, and names unusable as a single
/// path component (the name becomes the mirror directory under the cache).
pub fn load_repos(path: &Path) -> Result<Vec<RepoSpec>, ScanError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        ScanError::Config(format!("cannot read manifest {}: {}", path.display(), e))
    })?;
    let manifest: Manifest = toml::from_str(&raw).map_err(|e| {
        ScanError::Config(format!("invalid manifest {}: {}", path.display(), e))
    })?;
    validate(&manifest.repos)?;
    Ok(manifest.repos)
}

fn validate(repos: &[RepoSpec]) -> Result<(), ScanError> {
    if repos.is_empty() {
        return Err(ScanError::Config(
            "manifest declares no repositories".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for repo in repos {
        if !is_safe_name(&repo.name) {
            return Err(ScanError::Config(format!(
                "repository name '{}' is not usable as a directory name",
                repo.name
            )));
        }
        if !seen.insert(repo.name.as_str()) {
            return Err(ScanError::Config(format!(
                "duplicate repository name '{}'",
                repo.name
            )));
        }
        if repo.url.trim().is_empty() {
            return Err(ScanError::Config(format!(
                "repository '{}' has an empty url",
                repo.name
            )));
        }
        if let Some(branch) = &repo.branch {
            if branch.trim().is_empty() {
                return Err(ScanError::Config(format!(
                    "repository '{}' has an empty branch name",
                    repo.name
                )));
            }
        }
    }
    Ok(())
}

/// The name must stay a single path component under the cache directory.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains(char::is_whitespace)
}

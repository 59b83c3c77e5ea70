//! In-memory `GitTransport` double for resolver/mirror/history unit tests.
//!
//! Records every operation in `calls` so tests can assert ordering claims
//! such as "strict mode fails before any clone or fetch is attempted".

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

use super::GitTransport;

/// Scripted remote + local state. Cutoff comparisons are plain string
/// comparisons, so tests must use one offset (`+0000`) throughout.
#[derive(Default)]
pub struct FakeGit {
    /// url → branches that exist on the remote.
    pub remote_branches: HashMap<String, Vec<String>>,
    /// url → branch advertised by the remote's symbolic HEAD.
    pub symrefs: HashMap<String, String>,
    /// ref name → ascending `(cutoff-format timestamp, commit id)` history.
    pub history: HashMap<String, Vec<(String, String)>>,
    /// When set, fetches fail with a transport error.
    pub fail_fetch: bool,
    /// Operation log, e.g. `"clone url=... branch=main"`.
    pub calls: RefCell<Vec<String>>,
    tracked: RefCell<HashMap<PathBuf, Vec<String>>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a remote with the given branches; the first one is also the
    /// symbolic default.
    pub fn with_remote(mut self, url: &str, branches: &[&str]) -> Self {
        if let Some(first) = branches.first() {
            self.symrefs.insert(url.to_string(), (*first).to_string());
        }
        self.remote_branches
            .insert(url.to_string(), branches.iter().map(|b| b.to_string()).collect());
        self
    }

    /// Remote that advertises no symbolic HEAD (older server).
    pub fn without_symref(mut self, url: &str) -> Self {
        self.symrefs.remove(url);
        self
    }

    /// Seed history for a local ref, ascending by timestamp.
    pub fn with_history(mut self, ref_name: &str, commits: &[(&str, &str)]) -> Self {
        self.history.insert(
            ref_name.to_string(),
            commits.iter().map(|(t, c)| (t.to_string(), c.to_string())).collect(),
        );
        self
    }

    /// Pretend a mirror at `dir` already tracks `branch`.
    pub fn with_tracked(self, dir: &Path, branch: &str) -> Self {
        self.tracked
            .borrow_mut()
            .insert(dir.to_path_buf(), vec![branch.to_string()]);
        self
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    /// True when no clone or fetch was ever attempted.
    pub fn no_transfers(&self) -> bool {
        !self
            .calls
            .borrow()
            .iter()
            .any(|c| c.starts_with("clone") || c.starts_with("fetch"))
    }
}

impl GitTransport for FakeGit {
    fn remote_branch_exists(&self, url: &str, branch: &str) -> Result<bool, ScanError> {
        self.record(format!("ls-remote url={url} branch={branch}"));
        Ok(self
            .remote_branches
            .get(url)
            .is_some_and(|branches| branches.iter().any(|b| b == branch)))
    }

    fn remote_default_branch(&self, url: &str) -> Result<Option<String>, ScanError> {
        self.record(format!("symref url={url}"));
        Ok(self.symrefs.get(url).cloned())
    }

    fn clone_single_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Path,
        shallow_since: Option<&str>,
    ) -> Result<(), ScanError> {
        self.record(format!(
            "clone url={url} branch={branch} since={}",
            shallow_since.unwrap_or("-")
        ));
        // Materialize enough of a mirror for existence/validity checks.
        fs::create_dir_all(dest.join(".git"))?;
        self.tracked
            .borrow_mut()
            .entry(dest.to_path_buf())
            .or_default()
            .push(branch.to_string());
        Ok(())
    }

    fn set_remote_url(&self, dir: &Path, url: &str) -> Result<(), ScanError> {
        self.record(format!("set-url dir={} url={url}", dir.display()));
        Ok(())
    }

    fn fetch_single_branch(
        &self,
        dir: &Path,
        branch: &str,
        shallow_since: Option<&str>,
    ) -> Result<(), ScanError> {
        self.record(format!(
            "fetch dir={} branch={branch} since={}",
            dir.display(),
            shallow_since.unwrap_or("-")
        ));
        if self.fail_fetch {
            return Err(ScanError::Git {
                context: "fetch".to_string(),
                stderr: "fatal: unable to access remote".to_string(),
            });
        }
        let mut tracked = self.tracked.borrow_mut();
        let branches = tracked.entry(dir.to_path_buf()).or_default();
        if !branches.iter().any(|b| b == branch) {
            branches.push(branch.to_string());
        }
        Ok(())
    }

    fn tracked_branches(&self, dir: &Path) -> Result<Vec<String>, ScanError> {
        Ok(self.tracked.borrow().get(dir).cloned().unwrap_or_default())
    }

    fn commit_before(
        &self,
        _dir: &Path,
        ref_name: &str,
        cutoff: &str,
    ) -> Result<Option<String>, ScanError> {
        self.record(format!("rev-list ref={ref_name} before={cutoff}"));
        let history = self.history.get(ref_name).ok_or_else(|| ScanError::Git {
            context: format!("rev-list -1 --before={cutoff} {ref_name}"),
            stderr: format!("fatal: ambiguous argument '{ref_name}': unknown revision"),
        })?;
        Ok(history
            .iter()
            .rev()
            .find(|(ts, _)| ts.as_str() <= cutoff)
            .map(|(_, commit)| commit.clone()))
    }
}

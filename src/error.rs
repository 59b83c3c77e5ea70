//! Unified error type for the scanner.
//!
//! Every variant is fatal for the whole run: the report is only written after
//! all repositories and instants resolved cleanly. The one tolerated
//! non-error outcome — an instant predating a branch's history — is modeled
//! as `Option::None` at the query site, not here.

use thiserror::Error;

/// All errors that can abort a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Malformed manifest or flag values, detected before any network activity.
    #[error("configuration error: {0}")]
    Config(String),

    /// A requested branch does not exist on the remote (strict mode).
    #[error("[{repo}] requested branch '{branch}' does not exist on remote")]
    BranchNotFound { repo: String, branch: String },

    /// No symbolic HEAD advertised and no conventional candidate branch found.
    #[error("[{repo}] cannot determine remote default branch")]
    NoDefaultBranch { repo: String },

    /// The mirror path exists but holds no git metadata.
    #[error("path {path} exists but is not a git repository")]
    CorruptMirror { path: String },

    /// An existing mirror already tracks a different branch. Refetching under
    /// a new name would mix two histories in one mirror, so this is fatal.
    #[error("[{repo}] mirror tracks branch '{tracked}' but '{requested}' was requested; remove the mirror directory to switch")]
    BranchConflict {
        repo: String,
        tracked: String,
        requested: String,
    },

    /// A git subprocess exited non-zero; stderr is carried verbatim.
    #[error("git {context} failed: {stderr}")]
    Git { context: String, stderr: String },

    /// I/O error (cache directory creation, report write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

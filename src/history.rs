//! Time-indexed commit resolution: map (mirror, branch, instant) to the
//! commit that was the branch tip at that instant.

use std::path::Path;

use crate::error::ScanError;
use crate::git::GitTransport;
use git_heads::TimeInstant;

/// The most recent commit on the tracked remote ref at or before `instant`.
///
/// The instant's embedded offset goes into the cutoff string explicitly, so
/// the answer is independent of the process-local timezone. `Ok(None)` means
/// the branch had no history yet at that instant (an expected outcome for the
/// early part of the window); a failing query is fatal.
pub fn commit_at<G: GitTransport>(
    git: &G,
    mirror: &Path,
    branch: &str,
    instant: &TimeInstant,
) -> Result<Option<String>, ScanError> {
    let tracking_ref = format!("origin/{branch}");
    git.commit_before(mirror, &tracking_ref, &instant.git_cutoff())
}

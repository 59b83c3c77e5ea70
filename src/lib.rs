//! # git-heads — branch-tip time series over partial git mirrors
//!
//! Tracks one branch per configured remote repository in a space-efficient
//! local mirror and answers "which commit was the branch tip at local time T?"
//! across a rolling trailing window, emitting a CSV table.
//!
//! ## Library usage
//!
//! This crate is primarily a CLI tool, but the core value types and the pure
//! schedule logic are exposed as a library for integration testing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime};
use serde::Deserialize;

// ─── Repository model ────────────────────────────────────────────────

/// One repository to track, as declared in the manifest.
///
/// Identity is `name`; it doubles as the mirror's directory name under the
/// cache root and as the repository's CSV column header.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSpec {
    pub name: String,
    pub url: String,
    /// Branch to track. When absent, the remote's default branch is used.
    #[serde(default)]
    pub branch: Option<String>,
}

/// Outcome of remote branch resolution for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranch {
    pub repo: String,
    pub branch: String,
    /// True when the requested branch was missing and the remote default
    /// branch was used instead (non-strict mode only).
    pub was_fallback: bool,
}

// ─── Time model ──────────────────────────────────────────────────────

/// A timezone-qualified point in time at which a branch tip is looked up.
///
/// The embedded offset is fixed for the whole run; queries against git always
/// carry it as an explicit `+HHMM` string so the result never depends on the
/// process-local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeInstant(pub DateTime<FixedOffset>);

impl TimeInstant {
    /// Cutoff string for `git rev-list --before`, e.g. `2026-08-28 12:00 +0200`.
    #[must_use]
    pub fn git_cutoff(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M %z").to_string()
    }

    /// Row label for the output table (RFC 3339).
    #[must_use]
    pub fn label(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl fmt::Display for TimeInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A wall-clock time of day (`HH:MM`) at which each date is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    fn naive(self) -> NaiveTime {
        // hour/minute are range-checked in FromStr; the fallback is unreachable
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid time '{s}': expected HH:MM"))?;
        let hour: u8 = h.parse().map_err(|_| format!("invalid hour in '{s}'"))?;
        let minute: u8 = m.parse().map_err(|_| format!("invalid minute in '{s}'"))?;
        if hour > 23 {
            return Err(format!("hour {hour} out of range (0-23)"));
        }
        if minute > 59 {
            return Err(format!("minute {minute} out of range (0-59)"));
        }
        Ok(TimeOfDay { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse a UTC offset of the form `+HH:MM`, `-HH:MM`, `+HHMM` or `-HHMM`.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, String> {
    let err = || format!("invalid UTC offset '{s}': expected +HH:MM or +HHMM");
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1i32, &s[1..]),
        Some(b'-') => (-1i32, &s[1..]),
        _ => return Err(err()),
    };
    let digits = rest.replace(':', "");
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| err())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| err())?;
    if hours > 14 || minutes > 59 {
        return Err(format!("UTC offset '{s}' out of range"));
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(err)
}

// ─── Schedule generation ─────────────────────────────────────────────

/// Build the ordered query schedule: one instant per (date × time-of-day).
///
/// Dates run from `now - window_days` through `now - 1 day`, ascending.
/// "Today" is always excluded — it is still in progress and would yield a
/// premature data point. Times-of-day are emitted in the given order per date.
#[must_use]
pub fn build_schedule(
    window_days: u32,
    times: &[TimeOfDay],
    now: DateTime<FixedOffset>,
) -> Vec<TimeInstant> {
    let offset = *now.offset();
    let today = now.date_naive();
    let mut schedule = Vec::with_capacity(window_days as usize * times.len());
    for back in (1..=i64::from(window_days)).rev() {
        let date = today - Duration::days(back);
        for time in times {
            if let Some(dt) = date.and_time(time.naive()).and_local_timezone(offset).single() {
                schedule.push(TimeInstant(dt));
            }
        }
    }
    schedule
}

/// Fetch horizon for the mirrors: one calendar day before the earliest
/// scheduled instant, as `YYYY-MM-DD`. The extra day guards against the
/// inclusive/exclusive boundary semantics of `--shallow-since` vs `--before`.
#[must_use]
pub fn history_horizon(schedule: &[TimeInstant]) -> Option<String> {
    schedule
        .iter()
        .map(|i| i.0.date_naive())
        .min()
        .map(|d| (d - Duration::days(1)).format("%Y-%m-%d").to_string())
}

// ─── Report model ────────────────────────────────────────────────────

/// The tip commit resolved for one repository at one instant.
/// `None` means the branch had no history yet at that instant — a valid
/// outcome rendered as an empty cell, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResolution {
    pub repo: String,
    pub commit: Option<String>,
}

/// One output row: an instant plus its resolutions in configuration order.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub instant: TimeInstant,
    pub cells: Vec<CommitResolution>,
}

// ─── Tests ───────────────────────────────────────────────────────────


// ─── Property-based tests (proptest) ─────────────────────────────────

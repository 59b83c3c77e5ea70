//! Report assembly and CSV serialization.
//!
//! The table is rendered fully in memory and written in one shot at the end
//! of a successful run — a failed run never leaves a partially-written file
//! that looks valid.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::ScanError;
use git_heads::ReportRow;

/// Render the report: header `instant,<repo...>` in configuration order,
/// one row per instant ascending, empty cells for unresolved instants.
/// Rows and columns are emitted exactly as given — no reordering, no
/// deduplication.
#[must_use]
pub fn render_csv(rows: &[ReportRow], repo_order: &[String]) -> String {
    let mut out = String::new();
    out.push_str("instant");
    for name in repo_order {
        out.push(',');
        out.push_str(&csv_field(name));
    }
    out.push('\n');

    for row in rows {
        out.push_str(&csv_field(&row.instant.label()));
        for cell in &row.cells {
            out.push(',');
            if let Some(commit) = &cell.commit {
                out.push_str(&csv_field(commit));
            }
        }
        out.push('\n');
    }
    out
}

/// Write the rendered report to `path`.
pub fn write_report(path: &Path, rows: &[ReportRow], repo_order: &[String]) -> Result<(), ScanError> {
    fs::write(path, render_csv(rows, repo_order))?;
    info!(path = %path.display(), rows = rows.len(), "report written");
    Ok(())
}

/// Quote a field only when it needs it (comma, quote, newline).
/// Commit ids and RFC 3339 labels never do; repository names might.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

//! Branch-tip time series over partial git mirrors.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

mod cli;
mod config;
mod error;
mod git;
mod history;
mod mirror;
mod report;
mod resolver;

pub use error::ScanError;

fn main() {
    cli::run();
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

//! Run reports.
//!
//! Every run produces a [`RunReport`] regardless of outcome: the verdict,
//! the recorded statements, the complete generated test source, and the
//! seed that reproduces the command stream.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which phase was in flight when a hang was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangSide {
    /// The driver itself was idle; indicates an engine bug, not a SUT bug.
    Framework,
    /// The reference implementation hung: a harness problem to fix, not a
    /// finding against the SUT.
    Reference,
    /// The SUT hung: a finding.
    Sut,
}

/// The verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No divergence within the command budget at any attempted length.
    Passed,
    /// The SUT's outcome fell outside what the reference accepted.
    Diverged,
    /// A per-step timeout fired.
    Hung(HangSide),
}

impl Verdict {
    /// Whether the run found nothing.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Whether the run produced a finding (divergence or SUT hang).
    #[must_use]
    pub const fn is_finding(&self) -> bool {
        matches!(self, Self::Diverged | Self::Hung(HangSide::Sut))
    }
}

/// The record of one differential run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// The verdict.
    pub verdict: Verdict,
    /// Total commands executed across all attempts.
    pub commands_run: usize,
    /// The recorded statements of the final sequence.
    pub statements: Vec<String>,
    /// The complete generated test source.
    pub test_source: String,
    /// The seed that reproduces the command stream.
    pub seed: u64,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl RunReport {
    /// Serialize the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON to a path.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization or IO failure.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

//! Run configuration.
//!
//! A [`RunConfig`] describes one differential run: how many commands to
//! spend per attempt, how long sequences may grow, the per-step watchdog
//! timeout, and what to do when a hang fires. Configurations are plain
//! serde values and load from YAML the same way playbooks do.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// What the watchdog does when a step hangs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangPolicy {
    /// Print the emitted test and terminate the process (exit code 1).
    /// A hang leaves the driver thread stuck inside the offending call,
    /// so ending the process is the only fully safe escape.
    #[default]
    ExitProcess,
    /// Record the hang and let the driver abort at its next progress
    /// marker. Only suitable when the "hanging" operation eventually
    /// returns (slow steps), as in-process tests of the engine itself.
    Record,
}

/// Parameters of a differential run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Commands to generate per attempt before concluding no failure is
    /// reachable at the current sequence length.
    pub command_budget: usize,
    /// Sequence length of the first attempt.
    pub initial_sequence_len: usize,
    /// Ceiling for the doubling sequence-length escalation (inclusive).
    pub max_sequence_len: usize,
    /// Watchdog deadline per step, in milliseconds. The very first
    /// deadline is five times this, since warm-up can be slow.
    pub step_timeout_ms: u64,
    /// Hang handling.
    pub hang_policy: HangPolicy,
    /// Seed for the command generator. `None` draws a fresh seed and
    /// records it in the report for replay.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            command_budget: 100_000,
            initial_sequence_len: 10,
            max_sequence_len: 160,
            step_timeout_ms: 1_000,
            hang_policy: HangPolicy::default(),
            seed: None,
        }
    }
}

impl RunConfig {
    /// Load a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not parse or fails validation.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for nonsense values.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.command_budget == 0 {
            return Err(Error::InvalidConfig(
                "command_budget must be positive".to_string(),
            ));
        }
        if self.initial_sequence_len == 0 {
            return Err(Error::InvalidConfig(
                "initial_sequence_len must be positive".to_string(),
            ));
        }
        if self.max_sequence_len < self.initial_sequence_len {
            return Err(Error::InvalidConfig(
                "max_sequence_len must be at least initial_sequence_len".to_string(),
            ));
        }
        if self.step_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "step_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

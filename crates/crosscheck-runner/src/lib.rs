//! Crosscheck Runner
//!
//! The orchestrating driver for differential random testing: generates
//! random commands through a harness-supplied generator, executes each
//! against the reference and candidate implementations, compares outcomes
//! through the `crosscheck-oracle` machinery, and emits a compilable Rust
//! regression test at the first divergence or hang.
//!
//! The loop keeps counterexamples short by restarting sequences whenever
//! they exceed a size cap, and escalates that cap (doubling up to a
//! ceiling) only when a budget of commands finds nothing at the current
//! length.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_clone))]

pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod report;

#[cfg(test)]
pub mod test_fixtures;

pub use config::{HangPolicy, RunConfig};
pub use driver::Driver;
pub use emit::{EmitConfig, DEFAULT_HELPERS};
pub use error::{Error, Result};
pub use report::{HangSide, RunReport, Verdict};

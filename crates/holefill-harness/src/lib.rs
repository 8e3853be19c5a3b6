//! Scenario harness for the hole-filling allocator.
//!
//! This crate provides:
//! - Scenario fixtures: JSON files describing operation sequences with
//!   expected layouts or errors
//! - A runner that executes scenarios against a fresh allocator
//! - Report generation: human-readable + machine-readable verification reports
//! - Table rendering of layout snapshots for the interactive loop
//! - The interactive menu loop itself (the only place that does I/O)

#![forbid(unsafe_code)]

pub mod fixtures;
pub mod render;
pub mod repl;
pub mod report;
pub mod runner;
pub mod structured_log;

pub use fixtures::{ExpectSpec, OpSpec, Scenario, builtin_scenarios};
pub use report::{ScenarioReport, VerificationSummary};
pub use runner::{VerificationResult, run_scenario};

//! Sequential iteration runner for the Bezi desktop bridge.
//!
//! The runner provisions a Python virtual environment, initializes the
//! external `bezi_bridge.py` worker once, then repeatedly copies a
//! mode-selected prompt file to a fixed temp path and hands that path to the
//! worker, timing every successful iteration. The loop stops when a
//! configured iteration cap is reached or the worker exits non-zero; either
//! way a shutdown pass prints a run report, appends the collected timings to
//! `bezi_performance.csv`, and removes the temp prompt file.
//!
//! The [`bridge::Bridge`] trait isolates worker invocation so the loop and
//! orchestration logic are testable without spawning processes.

pub mod bridge;
pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod looping;
pub mod paths;
pub mod perf_log;
pub mod process;
pub mod report;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod venv;

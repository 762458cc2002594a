//! The main iteration loop: copy prompt, invoke bridge, record timing.

use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::bridge::{Bridge, BridgeStatus};
use crate::config::RunConfig;
use crate::paths::BridgePaths;
use crate::perf_log::IterationRecord;

/// Reason why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStop {
    /// The configured iteration cap was reached.
    CapReached,
    /// The bridge exited non-zero; the failed attempt is not recorded.
    BridgeFailed { exit_code: Option<i32> },
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    /// Number of successful iterations.
    pub iterations: u32,
    pub stop: LoopStop,
}

/// Run bridge iterations until the cap is reached or the bridge fails.
///
/// Each iteration copies the mode's prompt file verbatim over the fixed temp
/// path, invokes the bridge against it, and appends an [`IterationRecord`]
/// on success. Records accumulate in the caller-owned `records` vector so
/// they survive an `Err` return (spawn, timeout, or copy failures); the
/// caller's shutdown pass flushes whatever was collected.
pub fn run_loop<B: Bridge, F: FnMut(&IterationRecord)>(
    bridge: &B,
    config: &RunConfig,
    paths: &BridgePaths,
    records: &mut Vec<IterationRecord>,
    mut on_iteration: F,
) -> Result<LoopOutcome> {
    let prompt_path = paths.prompt_path(config.mode);
    let mut completed = 0u32;

    loop {
        if config.max_iterations > 0 && completed >= config.max_iterations {
            debug!(cap = config.max_iterations, "iteration cap reached");
            return Ok(LoopOutcome {
                iterations: completed,
                stop: LoopStop::CapReached,
            });
        }

        let started = Instant::now();
        fs::copy(&prompt_path, &paths.temp_prompt_path).with_context(|| {
            format!(
                "copy {} to {}",
                prompt_path.display(),
                paths.temp_prompt_path.display()
            )
        })?;

        match bridge.run_prompt(&paths.temp_prompt_path, config.debug)? {
            BridgeStatus::Success => {
                completed += 1;
                let record = IterationRecord::new(config.mode, completed, started.elapsed());
                on_iteration(&record);
                records.push(record);
            }
            BridgeStatus::Failed(exit_code) => {
                warn!(?exit_code, attempt = completed + 1, "bridge failed, stopping loop");
                return Ok(LoopOutcome {
                    iterations: completed,
                    stop: LoopStop::BridgeFailed { exit_code },
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::test_support::{ScriptedBridge, TestRun};

    fn config(max_iterations: u32) -> RunConfig {
        RunConfig {
            mode: Mode::Build,
            max_iterations,
            debug: false,
        }
    }

    #[test]
    fn stops_at_cap_without_extra_invocation() {
        let run = TestRun::new().expect("test run");
        let bridge = ScriptedBridge::always_succeeding();
        let mut records = Vec::new();

        let outcome = run_loop(&bridge, &config(3), &run.paths, &mut records, |_| {})
            .expect("loop");

        assert_eq!(outcome.stop, LoopStop::CapReached);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(bridge.run_calls(), 3);
        assert_eq!(records.len(), 3);
        let iterations: Vec<u32> = records.iter().map(|r| r.iteration).collect();
        assert_eq!(iterations, vec![1, 2, 3]);
        assert!(records.iter().all(|r| r.duration_secs >= 0.0));
    }

    #[test]
    fn failure_stops_unbounded_loop_and_drops_failed_attempt() {
        let run = TestRun::new().expect("test run");
        let bridge = ScriptedBridge::with_runs(vec![
            BridgeStatus::Success,
            BridgeStatus::Success,
            BridgeStatus::Failed(Some(1)),
        ]);
        let mut records = Vec::new();

        let outcome = run_loop(&bridge, &config(0), &run.paths, &mut records, |_| {})
            .expect("loop");

        assert_eq!(outcome.iterations, 2);
        assert_eq!(
            outcome.stop,
            LoopStop::BridgeFailed { exit_code: Some(1) }
        );
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn prompt_contents_reach_bridge_verbatim_each_iteration() {
        let run = TestRun::new().expect("test run");
        std::fs::write(run.paths.prompt_path(Mode::Build), "build instructions\n")
            .expect("write prompt");
        let bridge = ScriptedBridge::with_runs(vec![BridgeStatus::Success]);
        let mut records = Vec::new();

        run_loop(&bridge, &config(1), &run.paths, &mut records, |_| {}).expect("loop");

        assert_eq!(bridge.prompts_seen(), vec!["build instructions\n".to_string()]);
    }

    #[test]
    fn callback_sees_each_record() {
        let run = TestRun::new().expect("test run");
        let bridge = ScriptedBridge::always_succeeding();
        let mut records = Vec::new();
        let mut seen = Vec::new();

        run_loop(&bridge, &config(2), &run.paths, &mut records, |record| {
            seen.push(record.iteration);
        })
        .expect("loop");

        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn missing_prompt_copy_is_an_error() {
        let run = TestRun::new().expect("test run");
        std::fs::remove_file(run.paths.prompt_path(Mode::Build)).expect("remove prompt");
        let bridge = ScriptedBridge::always_succeeding();
        let mut records = Vec::new();

        let err = run_loop(&bridge, &config(1), &run.paths, &mut records, |_| {}).unwrap_err();
        assert!(err.to_string().contains("copy"));
        assert_eq!(bridge.run_calls(), 0);
    }
}

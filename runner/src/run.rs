//! Orchestration for a full run: prompt check, init, loop, scoped shutdown.

use std::fs;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::bridge::{Bridge, BridgeStatus};
use crate::config::RunConfig;
use crate::looping::{LoopStop, run_loop};
use crate::paths::BridgePaths;
use crate::perf_log::{self, IterationRecord};
use crate::report;

/// Outcome of a run that made it through the loop and shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub iterations: u32,
    pub stop: LoopStop,
}

/// Drive a full run against an initialized-on-demand bridge.
///
/// Order: status box, prompt-file check (fatal before any worker
/// invocation), one-time init (fatal on failure), then the loop. Shutdown —
/// report, CSV flush, temp prompt removal — runs on every path out of the
/// loop, including loop errors.
pub fn execute<B: Bridge>(
    config: &RunConfig,
    paths: &BridgePaths,
    bridge: &B,
) -> Result<RunOutcome> {
    println!("{}", report::status_box(config));

    let prompt_path = paths.prompt_path(config.mode);
    if !prompt_path.exists() {
        bail!("missing prompt file {}", prompt_path.display());
    }

    match bridge.init(config.debug)? {
        BridgeStatus::Success => {}
        BridgeStatus::Failed(code) => {
            bail!("bridge init failed with status {code:?}");
        }
    }

    let total = Instant::now();
    let mut records = Vec::new();
    let loop_result = run_loop(bridge, config, paths, &mut records, |record| {
        println!("{}", report::iteration_line(record));
    });
    shutdown(paths, &records, total.elapsed());

    let outcome = loop_result?;
    info!(iterations = outcome.iterations, stop = ?outcome.stop, "run complete");
    Ok(RunOutcome {
        iterations: outcome.iterations,
        stop: outcome.stop,
    })
}

/// Always-run teardown: report, CSV flush, temp prompt removal.
///
/// Flush and removal failures are logged rather than propagated so the
/// remaining cleanup still happens.
fn shutdown(paths: &BridgePaths, records: &[IterationRecord], total: Duration) {
    println!("{}", report::summary(records, total));

    if !records.is_empty()
        && let Err(err) = perf_log::append_records(&paths.csv_path, records)
    {
        warn!(err = %err, path = %paths.csv_path.display(), "failed to write performance log");
    }

    if paths.temp_prompt_path.exists()
        && let Err(err) = fs::remove_file(&paths.temp_prompt_path)
    {
        warn!(err = %err, path = %paths.temp_prompt_path.display(), "failed to remove temp prompt");
    }

    println!("Finished.");
}

//! Human-readable product output: status box, iteration lines, run report.
//!
//! These are pure string builders; the orchestrator prints them to stdout.

use std::time::Duration;

use crate::config::RunConfig;
use crate::perf_log::IterationRecord;

/// Banner shown after provisioning, before the prompt-file check.
pub fn status_box(config: &RunConfig) -> String {
    let cap = if config.max_iterations == 0 {
        "unbounded".to_string()
    } else {
        config.max_iterations.to_string()
    };
    let debug = if config.debug { "on" } else { "off" };
    format!(
        "==============================\n\
         Bezi bridge runner\n\
         Mode:       {}\n\
         Prompt:     {}\n\
         Iterations: {}\n\
         Debug:      {}\n\
         ==============================",
        config.mode,
        config.mode.prompt_file(),
        cap,
        debug
    )
}

/// Completion line printed after each successful iteration.
pub fn iteration_line(record: &IterationRecord) -> String {
    format!(
        "Iteration {} completed in {:.2}s",
        record.iteration, record.duration_secs
    )
}

/// Final report: every recorded duration plus total elapsed minutes.
pub fn summary(records: &[IterationRecord], total: Duration) -> String {
    let mut out = String::from("=== Run report ===\n");
    if records.is_empty() {
        out.push_str("No completed iterations.\n");
    }
    for record in records {
        out.push_str(&format!(
            "Iteration {}: {:.2}s\n",
            record.iteration, record.duration_secs
        ));
    }
    let minutes = (total.as_secs_f64() / 60.0 * 100.0).round() / 100.0;
    out.push_str(&format!("Total: {minutes:.2} minutes"));
    out
}

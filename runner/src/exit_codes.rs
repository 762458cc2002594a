//! Stable exit codes for the `bezi-runner` binary.

use crate::looping::LoopStop;
use crate::run::RunOutcome;

/// Run completed normally (iteration cap reached).
pub const OK: i32 = 0;
/// Missing prompt file, invalid config, provisioning or init failure.
pub const INVALID: i32 = 1;
/// The loop was halted by a non-zero bridge exit; shutdown still ran.
pub const BRIDGE_FAILED: i32 = 2;

/// Map a completed run onto its process exit code.
pub fn from_outcome(outcome: &RunOutcome) -> i32 {
    match outcome.stop {
        LoopStop::CapReached => OK,
        LoopStop::BridgeFailed { .. } => BRIDGE_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_failure_maps_to_distinct_code() {
        let outcome = RunOutcome {
            iterations: 2,
            stop: LoopStop::BridgeFailed { exit_code: Some(7) },
        };
        assert_eq!(from_outcome(&outcome), BRIDGE_FAILED);
    }

    #[test]
    fn cap_reached_maps_to_ok() {
        let outcome = RunOutcome {
            iterations: 5,
            stop: LoopStop::CapReached,
        };
        assert_eq!(from_outcome(&outcome), OK);
    }
}

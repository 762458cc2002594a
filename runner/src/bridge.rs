//! Bridge abstraction for worker invocation.
//!
//! The [`Bridge`] trait decouples the loop from the actual worker backend
//! (the `bezi_bridge.py` script run through the provisioned interpreter).
//! Tests use scripted bridges that return predetermined statuses without
//! spawning processes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::paths::BridgePaths;
use crate::process::{CommandOutput, run_command};
use crate::venv::PythonEnv;

/// How a bridge invocation ended, for invocations that actually ran.
///
/// Spawn failures and timeouts are `Err` instead; a worker that ran and
/// exited non-zero is `Failed` and terminates the loop without aborting
/// shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStatus {
    Success,
    Failed(Option<i32>),
}

impl BridgeStatus {
    pub fn success(self) -> bool {
        matches!(self, BridgeStatus::Success)
    }
}

/// Abstraction over worker invocation backends.
pub trait Bridge {
    /// One-time `--init` call before the loop.
    fn init(&self, debug: bool) -> Result<BridgeStatus>;

    /// One work iteration against the given prompt file.
    fn run_prompt(&self, prompt_path: &Path, debug: bool) -> Result<BridgeStatus>;
}

/// Bridge that runs `bezi_bridge.py` with the venv interpreter.
pub struct PythonBridge {
    python: PathBuf,
    script: PathBuf,
    workdir: PathBuf,
    log_path: PathBuf,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl PythonBridge {
    pub fn new(env: &PythonEnv, paths: &BridgePaths, config: &RunnerConfig) -> Self {
        Self {
            python: env.python().to_path_buf(),
            script: paths.root.join(&config.bridge_script),
            workdir: paths.root.clone(),
            log_path: paths.bridge_log_path.clone(),
            timeout: Duration::from_secs(config.bridge_timeout_secs),
            output_limit_bytes: config.output_limit_bytes,
        }
    }

    fn invoke(&self, args: &[&str], prompt_path: Option<&Path>, debug: bool) -> Result<BridgeStatus> {
        let mut cmd = Command::new(&self.python);
        cmd.arg(&self.script).args(args);
        if let Some(path) = prompt_path {
            cmd.arg(path);
        }
        if debug {
            cmd.arg("-d");
        }
        cmd.current_dir(&self.workdir);

        let output =
            run_command(cmd, self.timeout, self.output_limit_bytes).context("run bridge")?;
        write_bridge_log(&self.log_path, &output, self.output_limit_bytes)?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "bridge timed out");
            return Err(anyhow!("bridge timed out after {:?}", self.timeout));
        }
        if output.status.success() {
            debug!("bridge invocation succeeded");
            Ok(BridgeStatus::Success)
        } else {
            Ok(BridgeStatus::Failed(output.status.code()))
        }
    }
}

impl Bridge for PythonBridge {
    fn init(&self, debug: bool) -> Result<BridgeStatus> {
        info!(script = %self.script.display(), "initializing bridge");
        self.invoke(&["--init"], None, debug)
    }

    fn run_prompt(&self, prompt_path: &Path, debug: bool) -> Result<BridgeStatus> {
        debug!(prompt = %prompt_path.display(), "invoking bridge");
        self.invoke(&[], Some(prompt_path), debug)
    }
}

/// Persist captured worker output next to the run, truncated to the limit.
fn write_bridge_log(path: &Path, output: &CommandOutput, output_limit: usize) -> Result<()> {
    let mut buf = String::new();
    buf.push_str("=== stdout ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stdout));
    buf.push_str(&output.stdout_truncated_notice("bridge"));
    buf.push_str("\n=== stderr ===\n");
    buf.push_str(&String::from_utf8_lossy(&output.stderr));
    buf.push_str(&output.stderr_truncated_notice("bridge"));
    if output.timed_out {
        buf.push_str("\n[bridge timed out]\n");
    }

    if buf.len() > output_limit {
        // Back off to a char boundary; the limit may land inside a
        // multi-byte character from lossy-decoded worker output.
        let mut cut = output_limit;
        while cut > 0 && !buf.is_char_boundary(cut) {
            cut -= 1;
        }
        let truncated = format!(
            "{}\n[truncated {} bytes]\n",
            &buf[..cut],
            buf.len() - cut
        );
        fs::write(path, truncated)
            .with_context(|| format!("write bridge log {}", path.display()))?;
        return Ok(());
    }

    fs::write(path, buf).with_context(|| format!("write bridge log {}", path.display()))
}

//! Python virtual environment provisioning for the bridge script.
//!
//! "Activation" here just means invoking the venv's own interpreter directly;
//! nothing is sourced into the runner's environment.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::paths::BridgePaths;
use crate::process::run_command;

#[cfg(windows)]
const SYSTEM_PYTHON: &str = "python";
#[cfg(not(windows))]
const SYSTEM_PYTHON: &str = "python3";

/// Handle to a provisioned environment: the interpreter to invoke the bridge with.
#[derive(Debug, Clone)]
pub struct PythonEnv {
    python: PathBuf,
}

impl PythonEnv {
    pub fn python(&self) -> &Path {
        &self.python
    }
}

/// Ensure the virtual environment exists and return its interpreter.
///
/// Absent: create it, upgrade pip, and install `requirements.txt` if the
/// manifest is present. Present: reuse as-is. Any failing provisioning
/// command is an error.
pub fn provision(paths: &BridgePaths, config: &RunnerConfig) -> Result<PythonEnv> {
    let venv_dir = paths.root.join(&config.venv_dir);
    let python = interpreter_path(&venv_dir);

    if venv_dir.exists() {
        debug!(venv = %venv_dir.display(), "reusing existing virtual environment");
        if !python.exists() {
            bail!(
                "virtual environment {} has no interpreter at {}",
                venv_dir.display(),
                python.display()
            );
        }
        return Ok(PythonEnv { python });
    }

    info!(venv = %venv_dir.display(), "creating virtual environment");
    let mut create = Command::new(SYSTEM_PYTHON);
    create
        .arg("-m")
        .arg("venv")
        .arg(&venv_dir)
        .current_dir(&paths.root);
    run_checked(create, config, "create virtual environment")?;

    let mut upgrade = Command::new(&python);
    upgrade
        .args(["-m", "pip", "install", "--upgrade", "pip"])
        .current_dir(&paths.root);
    run_checked(upgrade, config, "upgrade pip")?;

    if paths.requirements_path.exists() {
        info!(manifest = %paths.requirements_path.display(), "installing dependencies");
        let mut install = Command::new(&python);
        install
            .args(["-m", "pip", "install", "-r"])
            .arg(&paths.requirements_path)
            .current_dir(&paths.root);
        run_checked(install, config, "install requirements")?;
    }

    Ok(PythonEnv { python })
}

fn run_checked(cmd: Command, config: &RunnerConfig, what: &str) -> Result<()> {
    let output = run_command(
        cmd,
        Duration::from_secs(config.bridge_timeout_secs),
        config.output_limit_bytes,
    )
    .with_context(|| what.to_string())?;
    if output.timed_out {
        bail!("{what} timed out after {}s", config.bridge_timeout_secs);
    }
    if !output.status.success() {
        return Err(anyhow!(
            "{what} failed with status {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(())
}

fn interpreter_path(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts").join("python.exe")
    } else {
        venv_dir.join("bin").join("python")
    }
}

//! Canonical file locations for a run root.

use std::path::PathBuf;

use crate::config::Mode;

/// All paths the runner reads or writes for a given run root.
///
/// Fields are public so tests can redirect the temp prompt path into a
/// scratch directory.
#[derive(Debug, Clone)]
pub struct BridgePaths {
    pub root: PathBuf,
    /// Optional ambient settings file.
    pub config_path: PathBuf,
    /// Optional pip dependency manifest.
    pub requirements_path: PathBuf,
    /// Append-only per-iteration timing log.
    pub csv_path: PathBuf,
    /// Captured bridge stdout/stderr, overwritten on every invocation.
    pub bridge_log_path: PathBuf,
    /// Fixed temp destination the prompt is copied to each iteration.
    pub temp_prompt_path: PathBuf,
}

impl BridgePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_path: root.join("bezi_runner.toml"),
            requirements_path: root.join("requirements.txt"),
            csv_path: root.join("bezi_performance.csv"),
            bridge_log_path: root.join("bezi_bridge.log"),
            temp_prompt_path: std::env::temp_dir().join("bezi_prompt.md"),
            root,
        }
    }

    /// Prompt file driving the given mode.
    pub fn prompt_path(&self, mode: Mode) -> PathBuf {
        self.root.join(mode.prompt_file())
    }
}

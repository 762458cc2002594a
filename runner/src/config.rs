//! Run configuration: mode/cap resolution from CLI tokens, plus the optional
//! `bezi_runner.toml` file for ambient settings (bridge script, venv, limits).

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Which prompt file drives each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Build,
    Plan,
}

impl Mode {
    /// File name of the prompt driving this mode, relative to the run root.
    pub fn prompt_file(self) -> &'static str {
        match self {
            Mode::Build => "PROMPT_build.md",
            Mode::Plan => "PROMPT_plan.md",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Build => "build",
            Mode::Plan => "plan",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run configuration derived once from CLI arguments. Immutable after
/// startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub mode: Mode,
    /// Maximum number of successful iterations. 0 = unbounded.
    pub max_iterations: u32,
    /// Forward `-d` to every bridge invocation.
    pub debug: bool,
}

impl RunConfig {
    /// Resolve mode and iteration cap from free-form positional tokens.
    ///
    /// The token `plan` selects plan mode and an unsigned-integer token sets
    /// the cap; both are order-independent and first-match-wins. Any other
    /// token is ignored. No `plan` token means build mode, no numeric token
    /// means unbounded.
    pub fn from_tokens(tokens: &[String], debug: bool) -> Self {
        let mut mode = Mode::Build;
        let mut max_iterations = 0u32;
        let mut saw_mode = false;
        let mut saw_cap = false;

        for token in tokens {
            if !saw_mode && token == "plan" {
                mode = Mode::Plan;
                saw_mode = true;
                continue;
            }
            if !saw_cap && !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
                // First numeric token claims the cap; saturate on overflow.
                max_iterations = token.parse::<u32>().unwrap_or(u32::MAX);
                saw_cap = true;
            }
        }

        Self {
            mode,
            max_iterations,
            debug,
        }
    }
}

/// Ambient runner settings (TOML, `bezi_runner.toml` in the run root).
///
/// Intended to be edited by humans; missing fields and a missing file fall
/// back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Path of the bridge script, relative to the run root.
    pub bridge_script: String,

    /// Directory of the Python virtual environment, relative to the run root.
    pub venv_dir: String,

    /// Wall-clock budget in seconds for a single bridge invocation.
    pub bridge_timeout_secs: u64,

    /// Truncate captured bridge stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            bridge_script: "bezi_bridge.py".to_string(),
            venv_dir: "venv".to_string(),
            bridge_timeout_secs: 60 * 60,
            output_limit_bytes: 100_000,
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bridge_script.trim().is_empty() {
            return Err(anyhow!("bridge_script must not be empty"));
        }
        if self.venv_dir.trim().is_empty() {
            return Err(anyhow!("venv_dir must not be empty"));
        }
        if self.bridge_timeout_secs == 0 {
            return Err(anyhow!("bridge_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RunnerConfig::default()`.
pub fn load_config(path: &Path) -> Result<RunnerConfig> {
    if !path.exists() {
        let cfg = RunnerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunnerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_tokens_defaults_to_unbounded_build() {
        let cfg = RunConfig::from_tokens(&[], false);
        assert_eq!(cfg.mode, Mode::Build);
        assert_eq!(cfg.max_iterations, 0);
        assert!(!cfg.debug);
    }

    #[test]
    fn plan_token_selects_plan_regardless_of_order() {
        let first = RunConfig::from_tokens(&tokens(&["plan", "5"]), false);
        let second = RunConfig::from_tokens(&tokens(&["5", "plan"]), false);
        assert_eq!(first.mode, Mode::Plan);
        assert_eq!(second.mode, Mode::Plan);
        assert_eq!(first.max_iterations, 5);
        assert_eq!(second.max_iterations, 5);
    }

    #[test]
    fn numeric_token_sets_cap() {
        let cfg = RunConfig::from_tokens(&tokens(&["5"]), false);
        assert_eq!(cfg.mode, Mode::Build);
        assert_eq!(cfg.max_iterations, 5);
    }

    #[test]
    fn first_numeric_token_wins() {
        let cfg = RunConfig::from_tokens(&tokens(&["3", "9"]), false);
        assert_eq!(cfg.max_iterations, 3);
    }

    #[test]
    fn overflowing_numeric_token_still_claims_cap() {
        let cfg = RunConfig::from_tokens(&tokens(&["5000000000", "7"]), false);
        assert_eq!(cfg.max_iterations, u32::MAX);
    }

    #[test]
    fn unrecognized_tokens_are_ignored() {
        let cfg = RunConfig::from_tokens(&tokens(&["deploy", "-3"]), true);
        assert_eq!(cfg.mode, Mode::Build);
        assert_eq!(cfg.max_iterations, 0);
        assert!(cfg.debug);
    }

    #[test]
    fn mode_prompt_files_are_stable() {
        assert_eq!(Mode::Build.prompt_file(), "PROMPT_build.md");
        assert_eq!(Mode::Plan.prompt_file(), "PROMPT_plan.md");
        assert_eq!(Mode::Plan.to_string(), "plan");
    }

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, RunnerConfig::default());
    }

    #[test]
    fn load_parses_partial_file_with_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bezi_runner.toml");
        fs::write(&path, "bridge_timeout_secs = 120\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.bridge_timeout_secs, 120);
        assert_eq!(cfg.venv_dir, "venv");
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bezi_runner.toml");
        fs::write(&path, "bridge_timeout_secs = 0\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("bridge_timeout_secs"));
    }
}

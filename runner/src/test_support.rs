//! Test-only helpers: scripted bridges and disposable run roots.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use tempfile::TempDir;

use crate::bridge::{Bridge, BridgeStatus};
use crate::config::Mode;
use crate::paths::BridgePaths;

/// Bridge returning predetermined statuses, recording what it was asked to run.
pub struct ScriptedBridge {
    init_status: BridgeStatus,
    run_statuses: RefCell<VecDeque<BridgeStatus>>,
    unbounded_success: bool,
    init_calls: Cell<u32>,
    run_calls: Cell<u32>,
    prompts_seen: RefCell<Vec<String>>,
}

impl ScriptedBridge {
    /// Succeeds on init and on every `run_prompt` call.
    pub fn always_succeeding() -> Self {
        Self {
            init_status: BridgeStatus::Success,
            run_statuses: RefCell::new(VecDeque::new()),
            unbounded_success: true,
            init_calls: Cell::new(0),
            run_calls: Cell::new(0),
            prompts_seen: RefCell::new(Vec::new()),
        }
    }

    /// Succeeds on init; `run_prompt` pops the queued statuses in order and
    /// errors once exhausted (guards against runaway unbounded loops).
    pub fn with_runs(statuses: Vec<BridgeStatus>) -> Self {
        Self {
            init_status: BridgeStatus::Success,
            run_statuses: RefCell::new(statuses.into()),
            unbounded_success: false,
            init_calls: Cell::new(0),
            run_calls: Cell::new(0),
            prompts_seen: RefCell::new(Vec::new()),
        }
    }

    /// Like [`with_runs`](Self::with_runs) but with a failing init call.
    pub fn with_failing_init(code: Option<i32>) -> Self {
        let mut bridge = Self::with_runs(Vec::new());
        bridge.init_status = BridgeStatus::Failed(code);
        bridge
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls.get()
    }

    pub fn run_calls(&self) -> u32 {
        self.run_calls.get()
    }

    /// Contents of the prompt file at each `run_prompt` call, in order.
    pub fn prompts_seen(&self) -> Vec<String> {
        self.prompts_seen.borrow().clone()
    }
}

impl Bridge for ScriptedBridge {
    fn init(&self, _debug: bool) -> Result<BridgeStatus> {
        self.init_calls.set(self.init_calls.get() + 1);
        Ok(self.init_status)
    }

    fn run_prompt(&self, prompt_path: &Path, _debug: bool) -> Result<BridgeStatus> {
        self.run_calls.set(self.run_calls.get() + 1);
        let contents = fs::read_to_string(prompt_path)?;
        self.prompts_seen.borrow_mut().push(contents);

        if self.unbounded_success {
            return Ok(BridgeStatus::Success);
        }
        match self.run_statuses.borrow_mut().pop_front() {
            Some(status) => Ok(status),
            None => bail!("scripted bridge exhausted"),
        }
    }
}

/// Disposable run root with both prompt files and a redirected temp path.
pub struct TestRun {
    _temp: TempDir,
    pub paths: BridgePaths,
}

impl TestRun {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        let mut paths = BridgePaths::new(temp.path());
        // Keep the fixed temp prompt inside the scratch dir so parallel
        // tests don't share the real system temp path.
        paths.temp_prompt_path = temp.path().join("bezi_prompt.md");

        fs::write(paths.prompt_path(Mode::Build), "# build prompt\n")?;
        fs::write(paths.prompt_path(Mode::Plan), "# plan prompt\n")?;

        Ok(Self { _temp: temp, paths })
    }
}

//! Sequential prompt-loop driver for the Bezi desktop bridge.
//!
//! Provisions a Python virtual environment, then repeatedly feeds a
//! mode-selected prompt file to `bezi_bridge.py`, timing every successful
//! iteration into `bezi_performance.csv`.

use anyhow::{Context, Result};
use bezi_runner::bridge::PythonBridge;
use bezi_runner::config::{self, RunConfig};
use bezi_runner::paths::BridgePaths;
use bezi_runner::{exit_codes, logging, run, venv};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "bezi-runner",
    version,
    about = "Sequential prompt-loop driver for the Bezi bridge"
)]
struct Cli {
    /// Free-form tokens: "plan" selects plan mode, an unsigned integer caps
    /// the number of iterations. Order-independent; other tokens are ignored.
    #[arg(value_name = "TOKEN", num_args = 0..=2)]
    tokens: Vec<String>,

    /// Forward the bridge's -d console trace flag to every invocation.
    #[arg(short = 'd', long)]
    debug: bool,
}

fn main() {
    logging::init();
    match run(Cli::parse()) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let run_config = RunConfig::from_tokens(&cli.tokens, cli.debug);

    let root = std::env::current_dir().context("resolve working directory")?;
    let paths = BridgePaths::new(root);
    let runner_config = config::load_config(&paths.config_path)?;

    let env = venv::provision(&paths, &runner_config)?;
    let bridge = PythonBridge::new(&env, &paths, &runner_config);

    let outcome = run::execute(&run_config, &paths, &bridge)?;
    Ok(exit_codes::from_outcome(&outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bezi_runner::config::Mode;

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["bezi-runner"]);
        assert!(cli.tokens.is_empty());
        assert!(!cli.debug);
    }

    #[test]
    fn parse_tokens_and_debug() {
        let cli = Cli::parse_from(["bezi-runner", "plan", "5", "-d"]);
        assert_eq!(cli.tokens, vec!["plan".to_string(), "5".to_string()]);
        assert!(cli.debug);

        let config = RunConfig::from_tokens(&cli.tokens, cli.debug);
        assert_eq!(config.mode, Mode::Plan);
        assert_eq!(config.max_iterations, 5);
        assert!(config.debug);
    }
}

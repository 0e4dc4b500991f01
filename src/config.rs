//! Command-line interface and resolved run configuration.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::harvest::fetch::DEFAULT_USER_AGENT;
use crate::harvest::index::DEFAULT_INDEX_URL;
use crate::harvest::pipeline::{DEFAULT_CHECKPOINT_EVERY, DEFAULT_WINDOW_DELAY, DEFAULT_WINDOW_SIZE};

pub const DEFAULT_OUTPUT: &str = "data/portfolios.json";
pub const DEFAULT_TIMEOUT_MS: u64 = 6000;
pub const INDEX_TIMEOUT: Duration = Duration::from_secs(30);
const PROGRESS_FILE: &str = ".progress.json";

/// Tunables for a harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub index_url: String,
    pub output_path: PathBuf,
    pub checkpoint_path: PathBuf,
    pub progress_path: PathBuf,
    pub window_size: usize,
    pub fetch_timeout: Duration,
    pub index_timeout: Duration,
    pub window_delay: Duration,
    pub checkpoint_every: usize,
    pub resume: bool,
    pub user_agent: String,
}

impl HarvestConfig {
    /// Defaults with checkpoint files placed next to `output_path`.
    pub fn for_output(output_path: impl Into<PathBuf>) -> Self {
        let output_path = output_path.into();
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            checkpoint_path: partial_path_for(&output_path),
            progress_path: progress_path_for(&output_path),
            output_path,
            window_size: DEFAULT_WINDOW_SIZE,
            fetch_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            index_timeout: INDEX_TIMEOUT,
            window_delay: DEFAULT_WINDOW_DELAY,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            resume: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::for_output(DEFAULT_OUTPUT)
    }
}

/// `<output>.partial`
pub fn partial_path_for(output: &Path) -> PathBuf {
    let mut raw = output.as_os_str().to_owned();
    raw.push(".partial");
    PathBuf::from(raw)
}

/// `.progress.json` beside the output file.
pub fn progress_path_for(output: &Path) -> PathBuf {
    output
        .parent()
        .map(|dir| dir.join(PROGRESS_FILE))
        .unwrap_or_else(|| PathBuf::from(PROGRESS_FILE))
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "portfolio-harvester",
    version,
    about = "Harvest contact and stack signals from developer portfolio sites"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch the index and harvest every listed portfolio
    Run(RunArgs),
    /// Summarize an existing output document
    Stats(StatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Markdown index listing the portfolios
    #[arg(long, env = "HARVEST_INDEX_URL", default_value = DEFAULT_INDEX_URL)]
    pub index_url: String,

    /// Where the final JSON document is written
    #[arg(long, short, env = "HARVEST_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Partial record file used for resumption (default: <output>.partial)
    #[arg(long, env = "HARVEST_CHECKPOINT")]
    pub checkpoint: Option<PathBuf>,

    /// Fetches dispatched per window
    #[arg(long, short = 'c', env = "HARVEST_CONCURRENCY", default_value_t = DEFAULT_WINDOW_SIZE)]
    pub concurrency: usize,

    /// Per-fetch deadline in milliseconds
    #[arg(long, env = "HARVEST_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Pause between windows in milliseconds
    #[arg(long, env = "HARVEST_DELAY_MS", default_value_t = DEFAULT_WINDOW_DELAY.as_millis() as u64)]
    pub delay_ms: u64,

    /// Write a checkpoint each time this many more targets have completed
    #[arg(long, env = "HARVEST_CHECKPOINT_EVERY", default_value_t = DEFAULT_CHECKPOINT_EVERY)]
    pub checkpoint_every: usize,

    /// Ignore any existing checkpoint and start over
    #[arg(long)]
    pub fresh: bool,
}

impl RunArgs {
    pub fn build_config(&self) -> HarvestConfig {
        let mut config = HarvestConfig::for_output(&self.output);
        if let Some(checkpoint) = &self.checkpoint {
            config.checkpoint_path = checkpoint.clone();
        }
        config.index_url = self.index_url.clone();
        config.window_size = self.concurrency.max(1);
        config.fetch_timeout = Duration::from_millis(self.timeout_ms);
        config.window_delay = Duration::from_millis(self.delay_ms);
        config.checkpoint_every = self.checkpoint_every.max(1);
        config.resume = !self.fresh;
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Output document produced by `run`
    #[arg(long, short, env = "HARVEST_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub input: PathBuf,

    /// Number of stack tags to list
    #[arg(long, default_value_t = 15)]
    pub limit: usize,

    /// List the portfolios tagged with this stack instead
    #[arg(long)]
    pub stack: Option<String>,
}

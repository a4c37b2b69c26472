//! Command-line flags. Anything given here overrides the environment.

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "arbitrage-scanner")]
#[command(about = "Scan venue price snapshots for direct and triangular arbitrage")]
pub struct Cli {
    /// JSON price snapshot (venue -> asset -> price)
    #[arg(short, long, env = "SNAPSHOT_PATH")]
    pub snapshot: Option<PathBuf>,

    /// Run a single scan and exit
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Write each scan report to this file as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seconds between scans
    #[arg(short, long)]
    pub interval: Option<u64>,
}

impl Cli {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.snapshot {
            config.snapshot_path = path.clone();
        }
        if let Some(secs) = self.interval.filter(|s| *s > 0) {
            config.scan_interval = Duration::from_secs(secs);
        }
    }
}

use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::error::SyncError;

pub const DEFAULT_REFRESH_SECS: u64 = 15;
pub const DEFAULT_RESYNC_MS: u64 = 1200;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Endpoints and timings of a session
///
/// Every flag can also come from the environment, which is how the
/// published sheet URLs are usually supplied.
#[derive(Debug, Clone, Parser)]
#[command(name = "potluck", about = "Shared \"who brings what\" list backed by a spreadsheet")]
pub struct Config {
    /// Published CSV export of the sheet
    #[arg(long = "read-url", env = "SHEET_CSV_URL")]
    pub read_url: String,

    /// Endpoint that appends a row to the sheet
    #[arg(long = "write-url", env = "SHEET_SCRIPT_URL")]
    pub write_url: String,

    /// Seconds between background refreshes
    #[arg(long = "refresh-secs", env = "POTLUCK_REFRESH_SECS", default_value_t = DEFAULT_REFRESH_SECS)]
    pub refresh_secs: u64,

    /// Milliseconds to wait after a submission before re-reading the sheet
    #[arg(long = "resync-ms", env = "POTLUCK_RESYNC_MS", default_value_t = DEFAULT_RESYNC_MS)]
    pub resync_ms: u64,

    /// Address the web front-end listens on
    #[arg(long, env = "POTLUCK_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,
}

impl Config {
    pub fn new(read_url: &str, write_url: &str) -> Self {
        Config {
            read_url: read_url.to_string(),
            write_url: write_url.to_string(),
            refresh_secs: DEFAULT_REFRESH_SECS,
            resync_ms: DEFAULT_RESYNC_MS,
            bind: DEFAULT_BIND.to_string(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn resync_delay(&self) -> Duration {
        Duration::from_millis(self.resync_ms)
    }

    /// Both endpoints must be absolute http(s) URLs and the interval non-zero.
    pub fn validate(&self) -> Result<(), SyncError> {
        check_url("read URL", &self.read_url)?;
        check_url("write URL", &self.write_url)?;
        if self.refresh_secs == 0 {
            return Err(SyncError::Config("refresh interval must be at least one second".into()));
        }
        Ok(())
    }
}

fn check_url(label: &str, raw: &str) -> Result<(), SyncError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SyncError::Config(format!("missing {label}")));
    }
    let url = Url::parse(raw).map_err(|e| SyncError::Config(format!("invalid {label}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SyncError::Config(format!("unsupported scheme '{other}' for {label}"))),
    }
}

//! Miscellaneous helper utilities.

use crate::arbitrage::ScanReport;
use crate::errors::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Overwrite `path` with the pretty-printed JSON report.
pub async fn write_report(path: &Path, report: &ScanReport) -> Result<()> {
    let body = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn report_file_is_replaced_each_time() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("opportunities.json");

        let first = ScanReport {
            skipped_count: 4,
            ..ScanReport::default()
        };
        write_report(&path, &first).await.expect("first write");
        write_report(&path, &ScanReport::default())
            .await
            .expect("second write");

        let raw = std::fs::read_to_string(&path).expect("readable");
        let back: ScanReport = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(back, ScanReport::default());
    }
}

use anyhow::Result;
use arbitrage_scanner::{
    aggregator::collect_price_table,
    arbitrage::{ArbitrageEngine, ScanReport},
    cli::Cli,
    config::AppConfig,
    provider::{SnapshotFeed, VenueFeed},
    utils,
};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.apply(&mut config);

    let engine = Arc::new(ArbitrageEngine::new(config.engine.clone())?);
    let feeds: Vec<Arc<dyn VenueFeed>> = engine
        .config()
        .venues
        .iter()
        .map(|venue| Arc::new(SnapshotFeed::new(venue, &config.snapshot_path)) as Arc<dyn VenueFeed>)
        .collect();

    tracing::info!(
        snapshot = %config.snapshot_path.display(),
        interval_secs = config.scan_interval.as_secs(),
        once = cli.once,
        "[INIT] arbitrage-scanner starting"
    );

    let mut ticker = tokio::time::interval(config.scan_interval);
    let mut ticks: u64 = 0;
    loop {
        ticker.tick().await;
        ticks += 1;

        let table = collect_price_table(&feeds, &config.retry).await;
        if table.is_empty() {
            tracing::info!("[HEARTBEAT] no prices available, skipping scan");
        } else {
            // CPU-bound; keep it off the runtime threads
            let engine = Arc::clone(&engine);
            let report = tokio::task::spawn_blocking(move || engine.scan(&table)).await?;
            log_report(&report, ticks);

            if let Some(path) = &cli.output {
                if let Err(e) = utils::write_report(path, &report).await {
                    tracing::warn!(error = %e, path = %path.display(), "[SCAN] failed to write report");
                }
            }
        }

        if cli.once {
            break;
        }
    }
    Ok(())
}

fn log_report(report: &ScanReport, ticks: u64) {
    if !report.opportunities.is_empty() {
        let opps: Vec<&str> = report
            .opportunities
            .iter()
            .map(|o| o.description.as_str())
            .collect();
        tracing::info!(
            count = opps.len(),
            truncated = report.truncated,
            skipped = report.skipped_count,
            opps = ?opps,
            "[OPP] opportunities found"
        );
    } else {
        tracing::info!(
            tick = ticks,
            evaluated = report.candidates_evaluated,
            skipped = report.skipped_count,
            truncated = report.truncated,
            "[HEARTBEAT] no opps above threshold"
        );
    }
}

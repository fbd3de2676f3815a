//! caratsync - keeps a local cache of Carat energy reports up to date.
//!
//! Runs the refresh scheduler in the foreground until interrupted. Send
//! SIGUSR1 to force an immediate refresh; `--show` prints the cached data
//! and exits.

mod reachability;
mod terminal;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use caratsync_core::network::FixedNetworkStatus;
use caratsync_core::{
    DataStore, DeviceSummary, HttpReportClient, NetworkStatus, NetworkStatusOracle,
    PresentationSink, RefreshScheduler, ReportCache, SchedulerHandle, SyncConfig,
};
use chrono::Utc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reachability::TcpReachability;
use terminal::{top_entries, TerminalSink};

// ============================================================================
// Constants
// ============================================================================

/// Log file name prefix inside the data directory
const LOG_FILE_PREFIX: &str = "caratsync.log";

const USAGE: &str = "Usage: caratsync [--show | --help]

Keeps the local Carat report cache fresh until interrupted.

Options:
  --show    Print the cached report summary and exit
  --help    Show this message

Environment:
  CARATSYNC_SERVER_URL  Report service base URL
  CARATSYNC_DATA_DIR    Directory for cached reports and logs
  RUST_LOG              Log filter (default: info)";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and to a daily-rotated file in `log_dir`. The returned
/// guard must be held until exit so buffered file output is flushed.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None => {}
        Some("--show") => return show_cached(),
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown argument: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }

    let config = SyncConfig::load()?;
    let data_dir = config.data_dir()?;
    let store = DataStore::new(&data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;

    let _log_guard = init_tracing(&data_dir);
    info!(data_dir = %data_dir.display(), "caratsync starting");

    let cache = Arc::new(ReportCache::open(store, config.cache_options()));
    let sink: Arc<dyn PresentationSink> = Arc::new(TerminalSink::new(Arc::clone(&cache)));

    let handle = match config.server_url.as_deref() {
        Some(server_url) => {
            let network: Arc<dyn NetworkStatusOracle> = Arc::new(TcpReachability::for_server(server_url)?);
            let mut client = HttpReportClient::new(server_url, config.request_timeout())?;
            if let Some(ref device_id) = config.device_id {
                client = client.with_device_id(device_id.clone());
            }
            info!(server = %client.base_url(), "Syncing with report service");

            RefreshScheduler::new(cache, network, sink, config.refresh_settings())
                .with_remote_client(Arc::new(client))
                .start()
        }
        None => {
            warn!("No server URL configured; showing cached data only");
            let network: Arc<dyn NetworkStatusOracle> =
                Arc::new(FixedNetworkStatus(NetworkStatus::Connected));
            RefreshScheduler::new(cache, network, sink, config.refresh_settings()).start()
        }
    };

    wait_for_shutdown(&handle).await?;
    handle.stop().await?;

    info!("caratsync shutting down");
    Ok(())
}

/// Wait for an interrupt, forwarding SIGUSR1 to the scheduler as a wake.
async fn wait_for_shutdown(handle: &SchedulerHandle) -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigusr1 = signal(SignalKind::user_defined1())?;
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => return result.map_err(Into::into),
                _ = sigterm.recv() => return Ok(()),
                _ = sigusr1.recv() => {
                    info!("Refresh requested");
                    handle.wake_now();
                }
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = handle;
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

/// Print what is currently cached on disk.
fn show_cached() -> Result<()> {
    let config = SyncConfig::load()?;
    let data_dir = config.data_dir()?;
    let cache = ReportCache::open(DataStore::new(&data_dir)?, config.cache_options());

    let reports = cache.get_reports();
    let summary = DeviceSummary::compute(
        reports.as_deref(),
        cache.get_freshness(),
        Utc::now().timestamp_millis(),
    );

    println!("Data directory: {}", data_dir.display());
    println!("J-Score:        {}", summary.score_text());
    println!("Battery life:   {}", summary.battery_life_text());
    println!("Last sync:      {}", summary.updated_text());

    if let Some(reports) = reports {
        println!(
            "Drain (%/h):    model {:.2}, os {:.2}, similar apps {:.2}",
            reports.model.expected_value, reports.os.expected_value, reports.similar_apps.expected_value
        );
        for change in &reports.changes_since_last_week {
            println!("    {}", change);
        }
    }

    for (kind, entries) in [("Hogs", cache.get_hog_report()), ("Bugs", cache.get_bug_report())] {
        match entries {
            Some(entries) => {
                println!("{}: {}", kind, entries.len());
                for line in top_entries(&entries) {
                    println!("    {}", line);
                }
            }
            None => println!("{}: none", kind),
        }
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::Context;
use bridge::config::{self, BridgeConfig};
use bridge::logging::{self, LogTarget};
use clap::Parser;

/// HTTP relay that plays browser moves on the desktop board.
#[derive(Parser, Debug)]
#[command(name = "kingsrow-relay", version, about)]
struct Args {
    /// Listen address (defaults to KINGSROW_RELAY_ADDR or 127.0.0.1:8123).
    #[arg(long)]
    addr: Option<String>,

    /// Config file (defaults to KINGSROW_BRIDGE_CONFIG or the config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Calibration file.
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Directory for log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(config::get_config_path);
    let (mut config, config_problem) = BridgeConfig::load_or_default(&config_path);
    if args.calibration.is_some() {
        config.calibration_path = args.calibration;
    }

    let log_dir = args.log_dir.unwrap_or_else(config::get_log_dir);
    let _guard = logging::init(
        &log_dir,
        "kingsrow-relay",
        &config.log_filter(),
        LogTarget::FileAndStderr,
    )
    .with_context(|| format!("Failed to set up logging in {}", log_dir.display()))?;
    if let Some(e) = config_problem {
        tracing::warn!("{}; using default settings", e);
    }

    let calibration_path = config::get_calibration_path(&config);
    let calibration = bridge::load_calibration(&calibration_path).with_context(|| {
        format!(
            "The relay needs a calibration file ({})",
            calibration_path.display()
        )
    })?;

    let (state, worker) = bridge::relay::start(bridge::system_relay(&config, calibration));
    let app = bridge::relay::router(state);

    let addr = args.addr.unwrap_or_else(config::get_relay_addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Relay listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down relay");
        })
        .await?;

    worker.abort();
    Ok(())
}

use std::path::PathBuf;

use anyhow::Context;
use bridge::config::{self, BridgeConfig};
use bridge::logging::{self, LogTarget};
use clap::Parser;

/// Native messaging host connecting the browser extension to KingsRow.
#[derive(Parser, Debug)]
#[command(name = "kingsrow-host", version, about)]
// Browsers append arguments of their own (caller origin, parent window).
#[command(ignore_errors = true)]
struct Args {
    /// Calling extension origin, passed by the browser.
    origin: Option<String>,

    /// Config file (defaults to KINGSROW_BRIDGE_CONFIG or the config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Engine executable.
    #[arg(long)]
    kingsrow_path: Option<PathBuf>,

    /// Calibration file enabling the desktop fallback.
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Directory for log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(config::get_config_path);
    let (mut config, config_problem) = BridgeConfig::load_or_default(&config_path);
    if args.kingsrow_path.is_some() {
        config.kingsrow_path = args.kingsrow_path;
    }
    if args.calibration.is_some() {
        config.calibration_path = args.calibration;
    }

    // stdout carries the protocol; logs go to file only.
    let log_dir = args.log_dir.unwrap_or_else(config::get_log_dir);
    let _guard = logging::init(
        &log_dir,
        "kingsrow-host",
        &config.log_filter(),
        LogTarget::FileOnly,
    )
    .with_context(|| format!("Failed to set up logging in {}", log_dir.display()))?;
    if let Some(e) = config_problem {
        tracing::warn!("{}; using default settings", e);
    }

    tracing::info!(
        "KingsRow host starting (origin: {})",
        args.origin.as_deref().unwrap_or("unknown")
    );
    tracing::info!("Using config: {}", config_path.display());

    let calibration = bridge::load_calibration(&config::get_calibration_path(&config));
    let mut host = bridge::build_host(&config, calibration);

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let outcome = tokio::select! {
        result = host.run(&mut stdin, &mut stdout) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            Ok(())
        }
    };
    if let Err(e) = outcome {
        tracing::error!("Channel failed: {}", e);
    }

    host.shutdown().await;
    tracing::info!("KingsRow host stopped");
    Ok(())
}

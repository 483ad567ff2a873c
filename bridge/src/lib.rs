//! Bridge between a browser draughts client and the KingsRow engine.
//!
//! The host binary speaks length-prefixed JSON over stdio; each
//! `get_best_move` request is answered by the [`resolver::MoveResolver`],
//! which tries the engine process, a file exchange with the engine, the
//! desktop application and finally a built-in heuristic. The relay binary
//! accepts moves over HTTP and plays them on the desktop board.

pub mod config;
pub mod host;
pub mod logging;
pub mod protocol;
pub mod relay;
pub mod resolver;
pub mod session;

use std::path::Path;

use desktop::{AutomationExecutor, CalibrationMap, DesktopRelay, MoveDetector};
use engine::{EngineConnection, EngineLocator, FileExchange};

use crate::config::BridgeConfig;
use crate::host::Host;
use crate::resolver::MoveResolver;
use crate::session::Session;

/// Load the calibration map, logging instead of failing when absent.
pub fn load_calibration(path: &Path) -> Option<CalibrationMap> {
    if !path.is_file() {
        tracing::info!("No calibration file at {}", path.display());
        return None;
    }
    match CalibrationMap::load(path) {
        Ok(map) => Some(map),
        Err(e) => {
            tracing::warn!("Ignoring calibration file {}: {}", path.display(), e);
            None
        }
    }
}

/// Desktop relay driving the system window/input/capture backends.
pub fn system_relay(config: &BridgeConfig, calibration: CalibrationMap) -> DesktopRelay {
    DesktopRelay::new(
        AutomationExecutor::system(config.automation_settings()),
        MoveDetector::system(config.detection_settings()),
        calibration,
        config.play_delay(),
    )
    .with_detection_retries(config.detection_attempts, config.detection_interval())
}

/// Wire up the stdio host from configuration.
pub fn build_host(config: &BridgeConfig, calibration: Option<CalibrationMap>) -> Host {
    let settings = config.engine_settings();
    let transient_files = FileExchange::new(&settings.exchange_dir).transient_files();
    let locator = EngineLocator::from_env(config.kingsrow_path.clone());
    let engine = EngineConnection::new(locator, settings);

    let relay = calibration.map(|map| system_relay(config, map));
    let resolver = MoveResolver::standard(engine, relay);
    tracing::info!("Resolver chain: {:?}", resolver.strategy_names());
    Host::new(Session::new(transient_files), resolver)
}

//! # Proximity Feedback Entry Point
//!
//! Connects once to the ranging board, then drives the indicator outputs from
//! its distance readings until Ctrl-C or a link failure.
//!
//! ## Outputs
//! - Console log (`RUST_LOG=info` for per-cycle diagnostics).
//! - `data/logs/proximity_events.csv`: per-cycle event trace.
//!
//! Built without the `ble` feature, the binary drives a simulated board.

use std::{path::Path, process::ExitCode};

use log::{error, info, warn};

use proximity_feedback::component_a::link::Connector;
use proximity_feedback::component_b::{
    actuator::ConsoleActuators,
    supervisor::{SessionReport, Supervisor},
};
use proximity_feedback::config::{ControllerConfig, EVENT_LOG_PATH};
use proximity_feedback::error::ControllerError;
use proximity_feedback::utils::metrics::EventRecorder;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();
    info!("=== PROXIMITY FEEDBACK START ===");

    let config = ControllerConfig::default();
    let recorder = EventRecorder::new();
    if let Err(e) = recorder.start_exporter(Path::new(EVENT_LOG_PATH)) {
        warn!("event trace disabled ({}): {}", EVENT_LOG_PATH, e);
    }

    let result = run(config, recorder.clone()).await;
    recorder.stop_exporter();

    match result {
        Ok(report) => {
            info!(
                "=== PROXIMITY FEEDBACK FINISHED ({} cycles on {}) ===",
                report.stats.cycles, report.address
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "ble")]
async fn run(config: ControllerConfig, recorder: EventRecorder) -> Result<SessionReport, ControllerError> {
    use proximity_feedback::component_a::ble::BleConnector;

    let connector = BleConnector::from_config(&config).map_err(|source| ControllerError::Connection {
        address: config.peripheral_address.clone(),
        source,
    })?;
    supervise(connector, config, recorder).await
}

#[cfg(not(feature = "ble"))]
async fn run(config: ControllerConfig, recorder: EventRecorder) -> Result<SessionReport, ControllerError> {
    use proximity_feedback::component_a::simulated::SimulatedConnector;

    warn!("built without `ble`: driving a simulated ranging board");
    let connector = SimulatedConnector::new(&config.peripheral_address);
    supervise(connector, config, recorder).await
}

async fn supervise<C: Connector>(
    connector: C,
    config: ControllerConfig,
    recorder: EventRecorder,
) -> Result<SessionReport, ControllerError> {
    let mut supervisor = Supervisor::new(connector, ConsoleActuators::new(), config, recorder);
    supervisor.run_until(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the session only ends on link failure.
        error!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

//! supervisor.rs
//! Owns the one connection attempt of a process and the session scope around it.
//!
//! - connect failure: reported, controller never started, outputs never touched
//! - session end (read failure or cancellation): outputs forced off, then the link
//!   is released; release failures are logged and swallowed
//! - no reconnect: one attempt per run

use std::future::Future;

use log::{error, info, warn};

use crate::component_a::link::{Connector, DistanceLink};
use crate::component_b::actuator::ActuationSink;
use crate::component_b::controller::Controller;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::utils::metrics::{Event, EventRecorder, SessionStats, SharedStats};

/// Summary of a session that ended by cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub address: String,
    pub stats: SessionStats,
}

pub struct Supervisor<C: Connector, S: ActuationSink> {
    connector: C,
    sink: S,
    config: ControllerConfig,
    recorder: EventRecorder,
    stats: SharedStats,
}

impl<C: Connector, S: ActuationSink> Supervisor<C, S> {
    pub fn new(connector: C, sink: S, config: ControllerConfig, recorder: EventRecorder) -> Self {
        Self {
            connector,
            sink,
            config,
            recorder,
            stats: SharedStats::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.lock().clone()
    }

    /// Run a session until the link fails. Only returns `Err`.
    pub async fn run(&mut self) -> Result<SessionReport, ControllerError> {
        self.run_until(std::future::pending()).await
    }

    /// Run a session until the link fails or `shutdown` completes.
    ///
    /// `Ok` means the session was cancelled cleanly.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<SessionReport, ControllerError>
    where
        F: Future<Output = ()>,
    {
        let address = self.connector.address().to_string();

        let mut link = match self.connector.connect().await {
            Ok(link) => link,
            Err(source) => {
                error!("[Supervisor] failed to connect to {}: {}", address, source);
                return Err(ControllerError::Connection { address, source });
            }
        };
        info!("[Supervisor] connected to {}", address);

        let mut controller = Controller::new(&self.config, self.recorder.clone(), self.stats.clone());

        let outcome = {
            let session = controller.run(&mut link, &mut self.sink);
            tokio::select! {
                result = session => match result {
                    Ok(never) => match never {},
                    Err(e) => Err(e),
                },
                _ = shutdown => {
                    info!("[Supervisor] shutdown requested");
                    Ok(())
                }
            }
        };
        // The controller's guard has already turned the outputs off; repeat it
        // here so a sink that failed mid-shutdown gets a second attempt.
        self.sink.all_off();

        self.recorder.record(Event::SessionClosed {
            seq: controller.cycles(),
            ts_ns: self.recorder.now_ns(),
            reason: if outcome.is_ok() { "cancelled" } else { "sample_read_failed" },
        });

        release(&mut link, &address).await;

        let stats = self.stats();
        info!(
            "[Supervisor] session closed after {} cycles ({} alarm, {} silent)",
            stats.cycles, stats.alarm_cycles, stats.silent_cycles
        );

        outcome.map(|()| SessionReport { address, stats })
    }
}

async fn release<L: DistanceLink + ?Sized>(link: &mut L, address: &str) {
    match link.disconnect().await {
        Ok(()) => info!("[Supervisor] released {}", address),
        Err(e) => warn!("[Supervisor] release of {} failed: {}", address, e),
    }
}

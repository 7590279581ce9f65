//! controller.rs
//! Closed-loop proximity controller: one distance sample per cycle drives the outputs.
//!
//! Cycle:
//! 1. AwaitingSample: read one distance from the link (no timeout; a stalled link stalls the loop)
//! 2. Computing: intensity curve + cadence curve
//! 3. Actuating: intensity and alarm written before any beep timing starts
//! 4. BeepingOn → BeepingOffDelay for an audible plan, buzzer held off when silent
//! 5. IdleDelay: fixed cycle delay, always last
//!
//! A failed read ends the loop (Failed). Outputs are held through a `ShutdownGuard`,
//! so they are forced off whether the loop returns an error or its future is dropped.

use std::convert::Infallible;

use log::{debug, error, info};
use tokio::time::{self, Duration};

use crate::component_a::link::{DistanceLink, read_sample};
use crate::component_b::actuator::{ActuationSink, ShutdownGuard, report};
use crate::component_b::mapping::{CadencePlan, Indication, map_cadence, map_intensity};
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::utils::metrics::{Event, EventRecorder, SharedStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    AwaitingSample,
    Computing,
    Actuating,
    BeepingOn,
    BeepingOffDelay,
    IdleDelay,
    Failed,
}

pub struct Controller {
    cycle_delay: Duration,
    payload_width: usize,
    recorder: EventRecorder,
    stats: SharedStats,
    phase: LoopPhase,
    seq: u64,
}

impl Controller {
    pub fn new(config: &ControllerConfig, recorder: EventRecorder, stats: SharedStats) -> Self {
        Self {
            cycle_delay: config.cycle_delay,
            payload_width: config.payload_width,
            recorder,
            stats,
            phase: LoopPhase::AwaitingSample,
            seq: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Number of completed sample reads.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.seq
    }

    fn enter(&mut self, phase: LoopPhase) {
        debug!("[Controller] cycle {} {:?} -> {:?}", self.seq, self.phase, phase);
        self.phase = phase;
    }

    /// Run cycles until a read fails. Never returns `Ok`.
    pub async fn run<L, S>(&mut self, link: &mut L, sink: &mut S) -> Result<Infallible, ControllerError>
    where
        L: DistanceLink + ?Sized,
        S: ActuationSink + ?Sized,
    {
        let mut outputs = ShutdownGuard::new(sink);

        loop {
            self.enter(LoopPhase::AwaitingSample);
            let distance = match read_sample(link, self.payload_width).await {
                Ok(d) => d,
                Err(e) => {
                    self.enter(LoopPhase::Failed);
                    error!("[Controller] {}", e);
                    return Err(ControllerError::SampleRead(e));
                }
            };
            self.seq += 1;
            info!("[Controller] received distance: {} cm", distance);
            self.recorder.record(Event::SampleReceived {
                seq: self.seq,
                ts_ns: self.recorder.now_ns(),
                distance_cm: distance,
            });

            self.enter(LoopPhase::Computing);
            let indication = map_intensity(distance);
            let plan = map_cadence(distance);
            self.stats.lock().record_cycle(distance, &indication, &plan);

            self.enter(LoopPhase::Actuating);
            self.apply_indication(&mut *outputs, &indication);

            self.sound(&mut *outputs, &plan).await;

            self.enter(LoopPhase::IdleDelay);
            time::sleep(self.cycle_delay).await;
        }
    }

    fn apply_indication<S: ActuationSink + ?Sized>(&self, sink: &mut S, indication: &Indication) {
        info!("[Controller] LED brightness {:.0}%", indication.intensity * 100.0);
        report(sink.set_intensity(indication.intensity));
        report(sink.set_alarm(indication.alarm));

        self.recorder.record(Event::Actuated {
            seq: self.seq,
            ts_ns: self.recorder.now_ns(),
            intensity: indication.intensity,
            alarm: indication.alarm,
        });
    }

    async fn sound<S: ActuationSink + ?Sized>(&mut self, sink: &mut S, plan: &CadencePlan) {
        if plan.is_silent() {
            info!("[Controller] buzzer off");
            report(sink.set_buzzer(false));
            self.recorder.record(Event::BuzzerSilent {
                seq: self.seq,
                ts_ns: self.recorder.now_ns(),
            });
            return;
        }

        let on = plan.on_duration();
        let delay = plan.delay_duration();
        let (on_secs, delay_secs) = plan.as_secs();
        info!(
            "[Controller] buzzer beeping for {}s with {}s delay",
            on_secs, delay_secs
        );

        self.enter(LoopPhase::BeepingOn);
        report(sink.set_buzzer(true));
        self.recorder.record(Event::BeepStarted {
            seq: self.seq,
            ts_ns: self.recorder.now_ns(),
            on_ms: on.as_millis() as u64,
            delay_ms: delay.as_millis() as u64,
        });
        time::sleep(on).await;

        self.enter(LoopPhase::BeepingOffDelay);
        report(sink.set_buzzer(false));
        self.recorder.record(Event::BeepFinished {
            seq: self.seq,
            ts_ns: self.recorder.now_ns(),
        });
        time::sleep(delay).await;
    }
}

//! Event recording and session statistics for the control loop.
//!
//! Two independent paths:
//! - **EventRecorder:** lock-free queue → background CSV exporter thread.
//! - **SessionStats:** shared counters that outlive a cancelled loop, so the
//!   supervisor can always report a summary.
//!
//! Event trace per cycle: sample received → actuated → beep started/finished (or silent).

use std::{
    fs::{File, create_dir_all},
    io::{self, BufWriter},
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_queue::ArrayQueue;
use csv::Writer;
use log::{debug, error};
use parking_lot::Mutex;
use serde::Serialize;

use crate::component_b::mapping::{CadencePlan, Indication};

const EVENT_QUEUE_CAPACITY: usize = 4_096;
const EXPORTER_POLL_MS: u64 = 20;

/// Control-cycle events. `seq` is the cycle number, starting at 1.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Distance decoded from the peripheral.
    SampleReceived { seq: u64, ts_ns: u64, distance_cm: i64 },
    /// Intensity and alarm outputs written.
    Actuated { seq: u64, ts_ns: u64, intensity: f64, alarm: bool },
    /// Buzzer switched on for a timed beep.
    BeepStarted { seq: u64, ts_ns: u64, on_ms: u64, delay_ms: u64 },
    /// Buzzer switched off after the beep, before the gap.
    BeepFinished { seq: u64, ts_ns: u64 },
    /// Distance out of audible range; buzzer held off.
    BuzzerSilent { seq: u64, ts_ns: u64 },
    /// Session ended; outputs have been forced off.
    SessionClosed { seq: u64, ts_ns: u64, reason: &'static str },
}

impl Event {
    pub fn seq(&self) -> u64 {
        match self {
            Event::SampleReceived { seq, .. }
            | Event::Actuated { seq, .. }
            | Event::BeepStarted { seq, .. }
            | Event::BeepFinished { seq, .. }
            | Event::BuzzerSilent { seq, .. }
            | Event::SessionClosed { seq, .. } => *seq,
        }
    }

    fn to_row(&self) -> EventRow {
        let mut row = EventRow {
            seq: self.seq(),
            ts_ns: 0,
            event: "",
            distance_cm: None,
            intensity: None,
            alarm: None,
            on_ms: None,
            delay_ms: None,
            detail: None,
        };
        match *self {
            Event::SampleReceived { ts_ns, distance_cm, .. } => {
                row.ts_ns = ts_ns;
                row.event = "SampleReceived";
                row.distance_cm = Some(distance_cm);
            }
            Event::Actuated { ts_ns, intensity, alarm, .. } => {
                row.ts_ns = ts_ns;
                row.event = "Actuated";
                row.intensity = Some(intensity);
                row.alarm = Some(alarm);
            }
            Event::BeepStarted { ts_ns, on_ms, delay_ms, .. } => {
                row.ts_ns = ts_ns;
                row.event = "BeepStarted";
                row.on_ms = Some(on_ms);
                row.delay_ms = Some(delay_ms);
            }
            Event::BeepFinished { ts_ns, .. } => {
                row.ts_ns = ts_ns;
                row.event = "BeepFinished";
            }
            Event::BuzzerSilent { ts_ns, .. } => {
                row.ts_ns = ts_ns;
                row.event = "BuzzerSilent";
            }
            Event::SessionClosed { ts_ns, reason, .. } => {
                row.ts_ns = ts_ns;
                row.event = "SessionClosed";
                row.detail = Some(reason);
            }
        }
        row
    }
}

#[derive(Debug, Serialize)]
struct EventRow {
    seq: u64,
    ts_ns: u64,
    event: &'static str,
    distance_cm: Option<i64>,
    intensity: Option<f64>,
    alarm: Option<bool>,
    on_ms: Option<u64>,
    delay_ms: Option<u64>,
    detail: Option<&'static str>,
}

/// Non-blocking event recorder with optional background CSV export.
///
/// `record()` never blocks the control loop; events are dropped if the
/// queue is full. Clones share the same queue and exporter.
#[derive(Clone)]
pub struct EventRecorder {
    queue: Arc<ArrayQueue<Event>>,
    run_start: Instant,
    exporter_running: Arc<AtomicBool>,
    exporter: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecorder {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(ArrayQueue::new(EVENT_QUEUE_CAPACITY)),
            run_start: Instant::now(),
            exporter_running: Arc::new(AtomicBool::new(false)),
            exporter: Arc::new(Mutex::new(None)),
        }
    }

    #[inline]
    pub fn record(&self, event: Event) {
        let _ = self.queue.push(event);
    }

    /// Nanoseconds since the recorder was created.
    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.run_start.elapsed().as_nanos() as u64
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<Event> {
        let mut out = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop() {
            out.push(event);
        }
        out
    }

    /// Spawn the exporter thread draining the queue into `output_csv`.
    /// The file is created up front so path errors reach the caller.
    pub fn start_exporter(&self, output_csv: &Path) -> io::Result<()> {
        let mut slot = self.exporter.lock();
        if slot.is_some() {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "event exporter already running"));
        }

        if let Some(dir) = output_csv.parent() {
            create_dir_all(dir)?;
        }
        let file = File::create(output_csv)?;

        let queue = self.queue.clone();
        let running = self.exporter_running.clone();
        running.store(true, Ordering::SeqCst);

        *slot = Some(thread::spawn(move || {
            let mut wtr = Writer::from_writer(BufWriter::new(file));

            while running.load(Ordering::SeqCst) {
                let mut any = false;
                while let Some(event) = queue.pop() {
                    any = true;
                    if let Err(e) = wtr.serialize(event.to_row()) {
                        error!("[EventRecorder] write failed: {}", e);
                    }
                }
                if any {
                    wtr.flush().ok();
                } else {
                    thread::sleep(Duration::from_millis(EXPORTER_POLL_MS));
                }
            }

            // Final drain after stop
            while let Some(event) = queue.pop() {
                wtr.serialize(event.to_row()).ok();
            }
            wtr.flush().ok();
            debug!("[EventRecorder] exporter exiting");
        }));
        Ok(())
    }

    /// Stop the exporter and wait for it to flush. No-op if not started.
    pub fn stop_exporter(&self) {
        self.exporter_running.store(false, Ordering::SeqCst);
        let handle = self.exporter.lock().take();
        if let Some(h) = handle {
            if h.join().is_err() {
                error!("[EventRecorder] exporter thread panicked");
            }
        }
    }
}

/// Per-session counters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionStats {
    pub cycles: u64,
    pub alarm_cycles: u64,
    pub silent_cycles: u64,
    pub last_distance_cm: Option<i64>,
}

impl SessionStats {
    pub fn record_cycle(&mut self, distance_cm: i64, indication: &Indication, plan: &CadencePlan) {
        self.cycles += 1;
        if indication.alarm {
            self.alarm_cycles += 1;
        }
        if plan.is_silent() {
            self.silent_cycles += 1;
        }
        self.last_distance_cm = Some(distance_cm);
    }
}

pub type SharedStats = Arc<Mutex<SessionStats>>;

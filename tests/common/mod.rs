//! Scripted link and recording actuators for session tests.
//!
//! Every link request and actuator command lands in one shared journal,
//! stamped with the (paused) tokio clock, so tests can assert on ordering
//! across the link/actuator boundary as well as on cadence timing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{Duration, Instant};

use proximity_feedback::component_a::link::{Connector, DistanceLink};
use proximity_feedback::component_b::actuator::{ActuationSink, ActuatorState};
use proximity_feedback::error::{ActuationError, LinkError};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Read,
    Disconnect,
    Intensity(f64),
    Alarm(bool),
    Buzzer(bool),
}

#[derive(Debug, Clone)]
pub enum Step {
    Payload(Vec<u8>),
    Fail,
    Stall,
}

pub fn cm(distance: u32) -> Step {
    Step::Payload(distance.to_le_bytes().to_vec())
}

#[derive(Clone)]
pub struct Journal {
    start: Instant,
    calls: Arc<Mutex<Vec<(Duration, Call)>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, call: Call) {
        self.calls.lock().push((self.start.elapsed(), call));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed(&self) -> Vec<(Duration, Call)> {
        self.calls.lock().clone()
    }

    /// Times at which reads were issued.
    pub fn read_times(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .iter()
            .filter(|(_, c)| *c == Call::Read)
            .map(|(t, _)| *t)
            .collect()
    }

    /// Output state replayed from the first `n` journal entries.
    pub fn state_after(&self, n: usize) -> ActuatorState {
        let mut state = ActuatorState::OFF;
        for call in self.calls().into_iter().take(n) {
            match call {
                Call::Intensity(v) => state.intensity = v,
                Call::Alarm(on) => state.alarm = on,
                Call::Buzzer(on) => state.buzzer = on,
                Call::Read | Call::Disconnect => {}
            }
        }
        state
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }
}

pub struct ScriptedConnector {
    steps: Vec<Step>,
    journal: Journal,
    fail_connect: bool,
    fail_disconnect: bool,
}

impl ScriptedConnector {
    pub fn new(steps: Vec<Step>, journal: Journal) -> Self {
        Self {
            steps,
            journal,
            fail_connect: false,
            fail_disconnect: false,
        }
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Link = ScriptedLink;

    fn address(&self) -> &str {
        "E0:5A:1B:7A:1B:F2"
    }

    async fn connect(&self) -> Result<ScriptedLink, LinkError> {
        if self.fail_connect {
            return Err(LinkError::PeripheralNotFound(self.address().to_string()));
        }
        Ok(ScriptedLink {
            steps: self.steps.iter().cloned().collect(),
            journal: self.journal.clone(),
            fail_disconnect: self.fail_disconnect,
        })
    }
}

pub struct ScriptedLink {
    steps: VecDeque<Step>,
    journal: Journal,
    fail_disconnect: bool,
}

#[async_trait]
impl DistanceLink for ScriptedLink {
    async fn read_distance(&mut self) -> Result<Vec<u8>, LinkError> {
        self.journal.push(Call::Read);
        match self.steps.pop_front() {
            Some(Step::Payload(bytes)) => Ok(bytes),
            Some(Step::Fail) => Err(LinkError::Transport("gatt read timed out".into())),
            Some(Step::Stall) => std::future::pending().await,
            None => Err(LinkError::Disconnected),
        }
    }

    async fn disconnect(&mut self) -> Result<(), LinkError> {
        self.journal.push(Call::Disconnect);
        if self.fail_disconnect {
            return Err(LinkError::Transport("bluez refused disconnect".into()));
        }
        Ok(())
    }
}

pub struct RecordingSink {
    journal: Journal,
}

impl RecordingSink {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl ActuationSink for RecordingSink {
    fn set_intensity(&mut self, level: f64) -> Result<(), ActuationError> {
        self.journal.push(Call::Intensity(level));
        Ok(())
    }

    fn set_alarm(&mut self, on: bool) -> Result<(), ActuationError> {
        self.journal.push(Call::Alarm(on));
        Ok(())
    }

    fn set_buzzer(&mut self, on: bool) -> Result<(), ActuationError> {
        self.journal.push(Call::Buzzer(on));
        Ok(())
    }
}

pub fn assert_near(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    let diff = if actual > expected { actual - expected } else { expected - actual };
    assert!(
        diff <= Duration::from_millis(5),
        "expected ~{expected:?}, got {actual:?}"
    );
}

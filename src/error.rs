//! Error types for the link, the control loop and the actuator drivers.
//!
//! Failures only originate at the two transport boundaries (connecting and
//! reading a sample). Actuator failures are reported but never end a session.

use std::fmt;

use thiserror::Error;

/// Transport-level failures from the distance peripheral.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no bluetooth adapter available")]
    NoAdapter,

    #[error("peripheral {0} not found")]
    PeripheralNotFound(String),

    #[error("characteristic {0} not exposed by peripheral")]
    CharacteristicMissing(String),

    #[error("invalid link identifier: {0}")]
    InvalidIdentifier(String),

    #[error("malformed distance payload ({len} bytes)")]
    MalformedPayload { len: usize },

    #[error("link disconnected")]
    Disconnected,

    #[error("transport error: {0}")]
    Transport(String),
}

/// Terminal failures of a supervised session.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to connect to {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: LinkError,
    },

    #[error("distance read failed: {0}")]
    SampleRead(#[source] LinkError),
}

/// The three physical outputs driven by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Intensity,
    Alarm,
    Buzzer,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Intensity => write!(f, "intensity LED"),
            Output::Alarm => write!(f, "alarm LED"),
            Output::Buzzer => write!(f, "buzzer"),
        }
    }
}

/// A driver refused a command. Logged by the caller, never fatal.
#[derive(Debug, Error)]
#[error("{output} driver rejected command: {reason}")]
pub struct ActuationError {
    pub output: Output,
    pub reason: String,
}

impl ActuationError {
    pub fn new(output: Output, reason: impl Into<String>) -> Self {
        Self {
            output,
            reason: reason.into(),
        }
    }
}

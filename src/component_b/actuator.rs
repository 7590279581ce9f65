//! actuator.rs
//! Output side of the controller: intensity LED, alarm LED and buzzer.
//! - `ActuationSink` is the driver boundary; setters are synchronous and idempotent
//! - driver failures are logged and never end a session
//! - `ShutdownGuard` forces every output off when a session scope unwinds,
//!   including when the owning future is dropped mid-await

use std::ops::{Deref, DerefMut};

use log::{debug, info, warn};

use crate::error::{ActuationError, Output};

/// Live state of the three outputs.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ActuatorState {
    pub intensity: f64,
    pub alarm: bool,
    pub buzzer: bool,
}

impl ActuatorState {
    pub const OFF: ActuatorState = ActuatorState {
        intensity: 0.0,
        alarm: false,
        buzzer: false,
    };

    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

/// Driver boundary for the indicator hardware.
pub trait ActuationSink {
    /// Set the intensity LED level; `level` is in [0, 1].
    fn set_intensity(&mut self, level: f64) -> Result<(), ActuationError>;

    fn set_alarm(&mut self, on: bool) -> Result<(), ActuationError>;

    fn set_buzzer(&mut self, on: bool) -> Result<(), ActuationError>;

    /// Best-effort shutdown of all three outputs. Every output is attempted
    /// even if an earlier one fails.
    fn all_off(&mut self) {
        report(self.set_intensity(0.0));
        report(self.set_alarm(false));
        report(self.set_buzzer(false));
    }
}

/// Log a non-fatal driver failure.
#[inline]
pub fn report(result: Result<(), ActuationError>) {
    if let Err(e) = result {
        warn!("[Actuators] {}", e);
    }
}

/// Host-side driver: keeps the output state and logs every effective change.
#[derive(Debug, Default)]
pub struct ConsoleActuators {
    state: ActuatorState,
}

impl ConsoleActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }
}

impl ActuationSink for ConsoleActuators {
    fn set_intensity(&mut self, level: f64) -> Result<(), ActuationError> {
        if !level.is_finite() {
            return Err(ActuationError::new(Output::Intensity, format!("level {level} is not finite")));
        }
        let level = level.clamp(0.0, 1.0);
        if (self.state.intensity - level).abs() > f64::EPSILON {
            debug!("[Actuators] intensity {:.0}% -> {:.0}%", self.state.intensity * 100.0, level * 100.0);
            self.state.intensity = level;
        }
        Ok(())
    }

    fn set_alarm(&mut self, on: bool) -> Result<(), ActuationError> {
        if self.state.alarm != on {
            info!("[Actuators] alarm LED {}", if on { "ON" } else { "off" });
            self.state.alarm = on;
        }
        Ok(())
    }

    fn set_buzzer(&mut self, on: bool) -> Result<(), ActuationError> {
        if self.state.buzzer != on {
            debug!("[Actuators] buzzer {}", if on { "on" } else { "off" });
            self.state.buzzer = on;
        }
        Ok(())
    }
}

/// Scoped access to a sink that turns every output off on drop.
pub struct ShutdownGuard<'a, S: ActuationSink + ?Sized> {
    sink: &'a mut S,
}

impl<'a, S: ActuationSink + ?Sized> ShutdownGuard<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }
}

impl<S: ActuationSink + ?Sized> Deref for ShutdownGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.sink
    }
}

impl<S: ActuationSink + ?Sized> DerefMut for ShutdownGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.sink
    }
}

impl<S: ActuationSink + ?Sized> Drop for ShutdownGuard<'_, S> {
    fn drop(&mut self) {
        debug!("[Actuators] forcing all outputs off");
        self.sink.all_off();
    }
}

//! mapping.rs
//! Distance → actuation transfer functions.
//!
//! Both mappers are total over every integer distance and side-effect free;
//! applying the result to the outputs is the controller's job.
//!
//! Intensity curve (priority order):
//! 1. d ≤ 0        → full intensity, alarm off (reading at or "inside" the sensor)
//! 2. d ≥ 100      → intensity off, alarm off
//! 3. d ≤ 3        → intensity off, alarm on (near-field override)
//! 4. otherwise    → linear ramp 1 − d/100, alarm off
//!
//! Cadence curve (priority order):
//! 1. d > 100      → silent
//! 2. d ≤ 5        → 0.2 s on / 0.01 s gap
//! 3. d ≤ 10       → 0.5 s on / 0.3 s gap
//! 4. d ≤ 30       → 1 s on / 0.5 s gap
//! 5. otherwise    → 2 s on / 1 s gap

use std::time::Duration;

/// Beyond this range the visual indicator is dark.
pub const FAR_LIMIT_CM: i64 = 100;
/// Inclusive upper bound of the alarm band (0, 3].
pub const ALARM_LIMIT_CM: i64 = 3;

/// Visual half of the actuation: intensity LED level and alarm LED.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indication {
    pub intensity: f64,
    pub alarm: bool,
}

/// Audible half of the actuation: buzzer on-time and the gap after it.
/// `(0, 0)` means silent for this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadencePlan {
    on_ms: u64,
    delay_ms: u64,
}

impl CadencePlan {
    pub const SILENT: CadencePlan = CadencePlan::from_millis(0, 0);

    pub const fn from_millis(on_ms: u64, delay_ms: u64) -> Self {
        Self { on_ms, delay_ms }
    }

    #[inline]
    pub fn is_silent(&self) -> bool {
        self.on_ms == 0
    }

    /// `(on, delay)` in seconds.
    pub fn as_secs(&self) -> (f64, f64) {
        (self.on_ms as f64 / 1000.0, self.delay_ms as f64 / 1000.0)
    }

    pub fn on_duration(&self) -> Duration {
        Duration::from_millis(self.on_ms)
    }

    pub fn delay_duration(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

pub fn map_intensity(distance_cm: i64) -> Indication {
    if distance_cm <= 0 {
        Indication { intensity: 1.0, alarm: false }
    } else if distance_cm >= FAR_LIMIT_CM {
        Indication { intensity: 0.0, alarm: false }
    } else if distance_cm <= ALARM_LIMIT_CM {
        Indication { intensity: 0.0, alarm: true }
    } else {
        Indication {
            intensity: 1.0 - distance_cm as f64 / 100.0,
            alarm: false,
        }
    }
}

pub fn map_cadence(distance_cm: i64) -> CadencePlan {
    match distance_cm {
        d if d > FAR_LIMIT_CM => CadencePlan::SILENT,
        d if d <= 5 => CadencePlan::from_millis(200, 10),
        d if d <= 10 => CadencePlan::from_millis(500, 300),
        d if d <= 30 => CadencePlan::from_millis(1_000, 500),
        _ => CadencePlan::from_millis(2_000, 1_000),
    }
}

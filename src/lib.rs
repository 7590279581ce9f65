//! # Proximity Feedback Controller
//!
//! Reads distance samples from a remote ultrasonic ranging board and turns
//! them into indicator outputs: an intensity LED that brightens as an object
//! approaches, an alarm LED for the near field, and a buzzer whose cadence
//! speeds up with proximity.
//!
//! ## Key Architecture
//! - **Component A (distance source):** `Connector`/`DistanceLink` traits,
//!   payload decoding, BLE GATT client (feature `ble`) and a simulated board.
//! - **Component B (actuation):** pure intensity/cadence mappers, the
//!   `ActuationSink` driver boundary, the timed control loop and the session
//!   supervisor.
//! - **Utils:** lock-free event recorder with CSV export, session counters.
//!
//! ## Concurrency
//! - One cooperative task on a current-thread tokio runtime.
//! - Suspension only at sample reads and cadence/cycle sleeps.
//! - Outputs are forced off on every exit path, cancellation included.

pub mod component_a;
pub mod component_b;
pub mod config;
pub mod error;
pub mod utils;

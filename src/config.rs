//! Compiled-in configuration for the proximity feedback controller.
//!
//! There are no runtime flags: the peripheral address and GATT identifiers
//! belong to one specific ranging board, and the timing constants define the
//! cadence the operator hears. `RUST_LOG` is the only environment input.

use std::time::Duration;

/// Bluetooth address of the ultrasonic ranging peripheral.
pub const PERIPHERAL_ADDRESS: &str = "E0:5A:1B:7A:1B:F2";

/// GATT service exposed by the ranging peripheral.
pub const RANGING_SERVICE_UUID: &str = "19B10000-E8F2-537E-4F6C-D104768A1214";

/// Characteristic carrying the latest HC-SR04 distance (cm, little-endian).
pub const DISTANCE_CHARACTERISTIC_UUID: &str = "19B10001-E8F2-537E-4F6C-D104768A1214";

/// Fixed pause after every control cycle, whatever the cadence branch.
pub const CYCLE_DELAY: Duration = Duration::from_secs(1);

/// How long the connector scans for the peripheral before giving up.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while waiting for the peripheral to show up in a scan.
pub const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Width in bytes of the distance payload written by the peripheral.
pub const DISTANCE_PAYLOAD_WIDTH: usize = 4;

/// CSV destination for the per-cycle event trace.
pub const EVENT_LOG_PATH: &str = "data/logs/proximity_events.csv";

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub peripheral_address: String,
    pub service_uuid: String,
    pub characteristic_uuid: String,
    pub cycle_delay: Duration,
    pub scan_timeout: Duration,
    pub payload_width: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            peripheral_address: PERIPHERAL_ADDRESS.to_string(),
            service_uuid: RANGING_SERVICE_UUID.to_string(),
            characteristic_uuid: DISTANCE_CHARACTERISTIC_UUID.to_string(),
            cycle_delay: CYCLE_DELAY,
            scan_timeout: SCAN_TIMEOUT,
            payload_width: DISTANCE_PAYLOAD_WIDTH,
        }
    }
}

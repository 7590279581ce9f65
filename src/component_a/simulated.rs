//! simulated.rs
//! Stand-in for the HC-SR04 ranging board when no Bluetooth peripheral is available.
//! - random-walk distance with bounded noise, like an object drifting in front of the sensor
//! - samples are encoded exactly as the board sends them (u32, little-endian)
//! - each read costs a short simulated GATT round-trip

use async_trait::async_trait;
use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::time::{self, Duration};

use crate::component_a::link::{Connector, DistanceLink};
use crate::error::LinkError;

const START_DISTANCE_CM: i64 = 80;
const MAX_DISTANCE_CM: i64 = 150;
const STEP_RANGE_CM: (i64, i64) = (-12, 12);
const READ_LATENCY: Duration = Duration::from_millis(20);

pub struct SimulatedConnector {
    address: String,
    seed: Option<u64>,
}

impl SimulatedConnector {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            seed: None,
        }
    }

    /// Deterministic walk, for reproducible demo runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[async_trait]
impl Connector for SimulatedConnector {
    type Link = SimulatedLink;

    fn address(&self) -> &str {
        &self.address
    }

    async fn connect(&self) -> Result<SimulatedLink, LinkError> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        debug!("[Link] simulated peripheral {} attached", self.address);
        Ok(SimulatedLink {
            rng,
            distance_cm: START_DISTANCE_CM,
            connected: true,
        })
    }
}

pub struct SimulatedLink {
    rng: StdRng,
    distance_cm: i64,
    connected: bool,
}

impl SimulatedLink {
    fn next_distance(&mut self) -> i64 {
        let (lo, hi) = STEP_RANGE_CM;
        let step = self.rng.random_range(lo..=hi);
        self.distance_cm = (self.distance_cm + step).clamp(0, MAX_DISTANCE_CM);
        self.distance_cm
    }
}

#[async_trait]
impl DistanceLink for SimulatedLink {
    async fn read_distance(&mut self) -> Result<Vec<u8>, LinkError> {
        if !self.connected {
            return Err(LinkError::Disconnected);
        }
        time::sleep(READ_LATENCY).await;

        let distance = self.next_distance() as u32;
        Ok(distance.to_le_bytes().to_vec())
    }

    async fn disconnect(&mut self) -> Result<(), LinkError> {
        self.connected = false;
        Ok(())
    }
}

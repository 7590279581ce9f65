//! ble.rs
//! GATT link to the ranging board over Bluetooth Low Energy (feature `ble`).
//! - scans for the compiled-in address, bounded by the configured scan timeout
//! - resolves the distance characteristic inside the ranging service
//! - one characteristic read per distance request

use std::str::FromStr;

use async_trait::async_trait;
use btleplug::api::{BDAddr, Central, Characteristic, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use log::{debug, info};
use tokio::time::{self, Instant};
use uuid::Uuid;

use crate::component_a::link::{Connector, DistanceLink, release_on_error};
use crate::config::{ControllerConfig, SCAN_POLL_INTERVAL};
use crate::error::LinkError;

impl From<btleplug::Error> for LinkError {
    fn from(e: btleplug::Error) -> Self {
        match e {
            btleplug::Error::NotConnected => LinkError::Disconnected,
            btleplug::Error::DeviceNotFound => LinkError::PeripheralNotFound("unknown".into()),
            other => LinkError::Transport(other.to_string()),
        }
    }
}

pub struct BleConnector {
    address: String,
    service: Uuid,
    characteristic: Uuid,
    scan_timeout: time::Duration,
}

impl BleConnector {
    pub fn from_config(config: &ControllerConfig) -> Result<Self, LinkError> {
        let parse = |s: &str| {
            Uuid::parse_str(s).map_err(|e| LinkError::InvalidIdentifier(format!("{s}: {e}")))
        };
        Ok(Self {
            address: config.peripheral_address.clone(),
            service: parse(&config.service_uuid)?,
            characteristic: parse(&config.characteristic_uuid)?,
            scan_timeout: config.scan_timeout,
        })
    }

    async fn find_peripheral(&self, adapter: &Adapter, target: BDAddr) -> Result<Peripheral, LinkError> {
        adapter.start_scan(ScanFilter::default()).await?;
        let deadline = Instant::now() + self.scan_timeout;

        let found = loop {
            let peripherals = adapter.peripherals().await?;
            if let Some(p) = peripherals.into_iter().find(|p| p.address() == target) {
                break Some(p);
            }
            if Instant::now() >= deadline {
                break None;
            }
            time::sleep(SCAN_POLL_INTERVAL).await;
        };

        if let Err(e) = adapter.stop_scan().await {
            debug!("[Link] stop_scan failed: {}", e);
        }
        found.ok_or_else(|| LinkError::PeripheralNotFound(self.address.clone()))
    }

    async fn resolve_characteristic(&self, peripheral: &Peripheral) -> Result<Characteristic, LinkError> {
        peripheral.discover_services().await?;
        peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == self.characteristic && c.service_uuid == self.service)
            .ok_or_else(|| LinkError::CharacteristicMissing(self.characteristic.to_string()))
    }
}

#[async_trait]
impl Connector for BleConnector {
    type Link = BleLink;

    fn address(&self) -> &str {
        &self.address
    }

    async fn connect(&self) -> Result<BleLink, LinkError> {
        let target = BDAddr::from_str(&self.address)
            .map_err(|e| LinkError::InvalidIdentifier(format!("{}: {}", self.address, e)))?;

        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(LinkError::NoAdapter)?;

        let peripheral = self.find_peripheral(&adapter, target).await?;
        peripheral.connect().await?;

        let setup = self.resolve_characteristic(&peripheral).await;
        let characteristic = release_on_error(setup, async {
            Ok(peripheral.disconnect().await?)
        })
        .await?;

        info!("[Link] GATT session open on {}", self.address);
        Ok(BleLink {
            peripheral,
            characteristic,
        })
    }
}

pub struct BleLink {
    peripheral: Peripheral,
    characteristic: Characteristic,
}

#[async_trait]
impl DistanceLink for BleLink {
    async fn read_distance(&mut self) -> Result<Vec<u8>, LinkError> {
        Ok(self.peripheral.read(&self.characteristic).await?)
    }

    async fn disconnect(&mut self) -> Result<(), LinkError> {
        match self.peripheral.is_connected().await {
            Ok(false) => Ok(()),
            Ok(true) => Ok(self.peripheral.disconnect().await?),
            Err(e) => {
                debug!("[Link] connection state unknown ({}), disconnecting anyway", e);
                Ok(self.peripheral.disconnect().await?)
            }
        }
    }
}

//! link.rs
//! Boundary to the remote ranging peripheral.
//! - `Connector` makes the single connection attempt of a session
//! - `DistanceLink` is the live connection: one request → one raw payload
//! - payloads are decoded here so the controller only ever sees centimeters

use std::future::Future;

use async_trait::async_trait;
use log::warn;

use crate::error::LinkError;

/// Live connection to the distance peripheral.
///
/// `read_distance` has no timeout of its own: a stalled peripheral stalls
/// the caller until the transport gives up or the session is cancelled.
#[async_trait]
pub trait DistanceLink: Send {
    /// Request the current distance; returns the raw little-endian payload.
    async fn read_distance(&mut self) -> Result<Vec<u8>, LinkError>;

    /// Release transport resources. Called exactly once per session.
    async fn disconnect(&mut self) -> Result<(), LinkError>;
}

/// Establishes a `DistanceLink` to one compiled-in peripheral.
#[async_trait]
pub trait Connector: Send + Sync {
    type Link: DistanceLink;

    /// Peripheral identity, for diagnostics.
    fn address(&self) -> &str;

    async fn connect(&self) -> Result<Self::Link, LinkError>;
}

/// Decode a little-endian unsigned distance payload into centimeters.
///
/// Narrower payloads are zero-extended; empty or over-wide payloads are
/// rejected as malformed.
pub fn decode_distance(payload: &[u8], width: usize) -> Result<i64, LinkError> {
    if payload.is_empty() || payload.len() > width || payload.len() > 8 {
        return Err(LinkError::MalformedPayload { len: payload.len() });
    }

    let mut bytes = [0u8; 8];
    bytes[..payload.len()].copy_from_slice(payload);
    let raw = u64::from_le_bytes(bytes);

    i64::try_from(raw).map_err(|_| LinkError::MalformedPayload { len: payload.len() })
}

/// Read and decode one sample.
pub async fn read_sample<L>(link: &mut L, width: usize) -> Result<i64, LinkError>
where
    L: DistanceLink + ?Sized,
{
    let payload = link.read_distance().await?;
    decode_distance(&payload, width)
}

/// Finish connection setup on a link that is already open.
///
/// If `setup` failed, `release` runs before the error is returned so the
/// peripheral is not left holding a half-opened connection. A release failure
/// is logged; the setup error is what the caller sees.
pub async fn release_on_error<T, F>(setup: Result<T, LinkError>, release: F) -> Result<T, LinkError>
where
    F: Future<Output = Result<(), LinkError>>,
{
    match setup {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Err(release_err) = release.await {
                warn!("[Link] release after failed setup failed: {}", release_err);
            }
            Err(e)
        }
    }
}

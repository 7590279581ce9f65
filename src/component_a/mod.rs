// Component A: distance source
// Everything on the peripheral side of the link: the connector/link
// traits, payload decoding, the BLE GATT client and a simulated board.

pub mod link;
pub mod simulated;
#[cfg(feature = "ble")]
pub mod ble;

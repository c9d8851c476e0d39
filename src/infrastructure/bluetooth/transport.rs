//! Radio and link abstractions
//!
//! The session only talks to these traits, so the btleplug backend can be
//! swapped for a scripted one in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::models::{AddressType, Attribute, DeviceAddress, DiscoveredDevice};
use crate::error::Result;

/// A Bluetooth central able to scan and open connections.
#[async_trait]
pub trait Radio: Send + Sync {
    type Link: Link;

    /// Scan for `duration`, then return every peripheral observed, in the
    /// order the platform reports them.
    async fn scan(&self, duration: Duration) -> Result<Vec<DiscoveredDevice>>;

    /// Open a connection to a previously scanned peripheral.
    async fn connect(&self, address: DeviceAddress, address_type: AddressType)
        -> Result<Self::Link>;
}

/// An open connection to one peripheral.
#[async_trait]
pub trait Link: Send + Sync {
    /// All characteristics exposed by the peripheral, in enumeration order.
    async fn characteristics(&self) -> Result<Vec<Attribute>>;

    async fn read(&self, attribute: &Attribute) -> Result<Vec<u8>>;

    async fn write(&self, attribute: &Attribute, value: &[u8]) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;
}

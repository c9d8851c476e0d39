use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::DeviceAddress;

/// Library error type.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BlinkyError {
    /// The host has no Bluetooth adapter at the configured index.
    #[error("no Bluetooth adapter available at index {0}")]
    NoAdapter(usize),
    /// The adapter no longer knows the peripheral that was matched during
    /// the scan, e.g. it went out of range between scan and connect.
    #[error("peripheral {0} is not known to the adapter")]
    PeripheralUnavailable(DeviceAddress),
    /// Read or write on a characteristic the connected device never exposed.
    #[error("attribute {0} is not exposed by the connected device")]
    UnknownAttribute(Uuid),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    /// Wrapper around platform Bluetooth errors.
    #[error("bluetooth transport error: {0}")]
    Transport(#[from] btleplug::Error),
}

pub type Result<T> = std::result::Result<T, BlinkyError>;

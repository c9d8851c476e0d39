use std::fmt;

use uuid::Uuid;

/// One parsed field of a peripheral's advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingRecord {
    pub ad_type: u8,
    pub description: String,
    pub value: String,
}

impl AdvertisingRecord {
    pub fn new(ad_type: u8, description: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            ad_type,
            description: description.into(),
            value: value.into(),
        }
    }
}

/// 48-bit Bluetooth device address, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress([u8; 6]);

impl DeviceAddress {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    Public,
    Random,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Random => f.write_str("random"),
        }
    }
}

/// A peripheral observed during one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub address: DeviceAddress,
    pub address_type: AddressType,
    /// Signal strength in dB, when the platform reported one.
    pub rssi: Option<i16>,
    pub records: Vec<AdvertisingRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeProperties {
    pub read: bool,
    pub write: bool,
    pub write_without_response: bool,
    pub notify: bool,
    pub indicate: bool,
}

impl fmt::Display for AttributeProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.read, "READ"),
            (self.write, "WRITE"),
            (self.write_without_response, "WRITE NO RESPONSE"),
            (self.notify, "NOTIFY"),
            (self.indicate, "INDICATE"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&set.join(" "))
    }
}

/// A GATT characteristic exposed by the connected device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub uuid: Uuid,
    pub service_uuid: Uuid,
    pub properties: AttributeProperties,
}

/// The two characteristics the mirror loop needs, if the device has them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAttributes {
    pub button: Option<Attribute>,
    pub led: Option<Attribute>,
}

impl ResolvedAttributes {
    pub fn both(&self) -> Option<(&Attribute, &Attribute)> {
        match (&self.button, &self.led) {
            (Some(button), Some(led)) => Some((button, led)),
            _ => None,
        }
    }
}

/// How a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    DeviceNotFound,
    AttributesMissing,
    Cancelled,
    IterationLimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    LogMessage(StatusMessage),
    DeviceFound {
        name: String,
        address: DeviceAddress,
        rssi: Option<i16>,
    },
    ConnectionStatus(ConnectionStatus),
    /// A characteristic of interest was located.
    AttributeFound {
        uuid: Uuid,
        properties: AttributeProperties,
    },
    AttributesResolved {
        button: Option<Uuid>,
        led: Option<Uuid>,
    },
    /// The LED now holds a value different from the previous write.
    ValueMirrored(Vec<u8>),
}

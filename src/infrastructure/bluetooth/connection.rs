//! BLE Connection Module
//!
//! Handles device connection and GATT characteristic access.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use btleplug::api::{CharPropFlags, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::domain::models::{Attribute, AttributeProperties, DeviceAddress};
use crate::error::{BlinkyError, Result};
use crate::infrastructure::bluetooth::transport::Link;

/// Open connection to one peripheral
pub struct BleConnection {
    peripheral: Peripheral,
    address: DeviceAddress,
    /// Platform handles from the last enumeration, keyed by (service, characteristic).
    handles: Mutex<HashMap<(Uuid, Uuid), Characteristic>>,
}

impl BleConnection {
    /// Connect and run service discovery. No timeout and no retry.
    pub async fn open(peripheral: Peripheral, address: DeviceAddress) -> Result<Self> {
        peripheral.connect().await?;
        info!("Device connected: {}", address);

        peripheral.discover_services().await?;
        debug!("Service discovery complete");

        Ok(Self {
            peripheral,
            address,
            handles: Mutex::new(HashMap::new()),
        })
    }

    fn handle(&self, attribute: &Attribute) -> Result<Characteristic> {
        let handles = self
            .handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handles
            .get(&(attribute.service_uuid, attribute.uuid))
            .cloned()
            .ok_or(BlinkyError::UnknownAttribute(attribute.uuid))
    }
}

fn properties_from_flags(flags: CharPropFlags) -> AttributeProperties {
    AttributeProperties {
        read: flags.contains(CharPropFlags::READ),
        write: flags.contains(CharPropFlags::WRITE),
        write_without_response: flags.contains(CharPropFlags::WRITE_WITHOUT_RESPONSE),
        notify: flags.contains(CharPropFlags::NOTIFY),
        indicate: flags.contains(CharPropFlags::INDICATE),
    }
}

/// Write without response when the characteristic allows it, matching a
/// plain unacknowledged GATT write command.
fn write_type_for(properties: &AttributeProperties) -> WriteType {
    if properties.write_without_response {
        WriteType::WithoutResponse
    } else {
        WriteType::WithResponse
    }
}

#[async_trait]
impl Link for BleConnection {
    async fn characteristics(&self) -> Result<Vec<Attribute>> {
        let characteristics = self.peripheral.characteristics();
        info!("Found {} characteristics", characteristics.len());

        let mut attributes = Vec::with_capacity(characteristics.len());
        let mut handles = HashMap::with_capacity(characteristics.len());
        for c in characteristics {
            let attribute = Attribute {
                uuid: c.uuid,
                service_uuid: c.service_uuid,
                properties: properties_from_flags(c.properties),
            };
            debug!(
                "Characteristic {} (service {}): {}",
                attribute.uuid, attribute.service_uuid, attribute.properties
            );
            handles.insert((c.service_uuid, c.uuid), c);
            attributes.push(attribute);
        }

        *self
            .handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = handles;
        Ok(attributes)
    }

    async fn read(&self, attribute: &Attribute) -> Result<Vec<u8>> {
        let characteristic = self.handle(attribute)?;
        let value = self.peripheral.read(&characteristic).await?;
        trace!("Read {:02x?} from {}", value, attribute.uuid);
        Ok(value)
    }

    async fn write(&self, attribute: &Attribute, value: &[u8]) -> Result<()> {
        let characteristic = self.handle(attribute)?;
        self.peripheral
            .write(&characteristic, value, write_type_for(&attribute.properties))
            .await?;
        trace!("Wrote {:02x?} to {}", value, attribute.uuid);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.peripheral.disconnect().await?;
        info!("Disconnected from {}", self.address);
        Ok(())
    }
}

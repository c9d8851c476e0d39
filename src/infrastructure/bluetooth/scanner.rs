//! BLE Scanner Module
//!
//! Bounded-duration discovery on a system adapter through btleplug.

use std::pin::pin;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    AddressType as PlatformAddressType, BDAddr, Central, CentralEvent, Manager as _,
    Peripheral as _, PeripheralProperties, ScanFilter,
};
use btleplug::platform::{Adapter, Manager, PeripheralId};
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::domain::models::{AddressType, AdvertisingRecord, DeviceAddress, DiscoveredDevice};
use crate::error::{BlinkyError, Result};
use crate::infrastructure::bluetooth::connection::BleConnection;
use crate::infrastructure::bluetooth::protocol::{self, ad_type, describe_ad_type};
use crate::infrastructure::bluetooth::transport::Radio;

/// BLE central backed by one system adapter
pub struct BleScanner {
    adapter: Adapter,
}

impl BleScanner {
    /// Open the adapter at `adapter_index` in the platform's adapter list.
    pub async fn new(adapter_index: usize) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .nth(adapter_index)
            .ok_or(BlinkyError::NoAdapter(adapter_index))?;

        match adapter.adapter_info().await {
            Ok(info) => info!("Using Bluetooth adapter: {}", info),
            Err(e) => debug!("Adapter info unavailable: {}", e),
        }

        Ok(Self { adapter })
    }
}

#[async_trait]
impl Radio for BleScanner {
    type Link = BleConnection;

    /// Only peripherals heard during this window are returned; devices the
    /// adapter merely remembers from earlier are left out.
    async fn scan(&self, duration: Duration) -> Result<Vec<DiscoveredDevice>> {
        info!("Scanning for {:?}...", duration);
        let events = self.adapter.events().await?;
        self.adapter.start_scan(ScanFilter::default()).await?;
        let observed = collect_first_seen(events.filter_map(observed_id), duration).await;
        self.adapter.stop_scan().await?;

        let mut devices = Vec::new();
        for id in observed {
            let props = match self.adapter.peripheral(&id).await {
                Ok(peripheral) => peripheral.properties().await,
                Err(e) => Err(e),
            };
            match props {
                Ok(Some(props)) => devices.push(device_from_properties(&props)),
                Ok(None) => debug!("Skipping {:?} without properties", id),
                Err(e) => warn!("Skipping {:?}, properties unavailable: {}", id, e),
            }
        }
        info!("Scan finished, {} devices seen", devices.len());
        Ok(devices)
    }

    async fn connect(
        &self,
        address: DeviceAddress,
        address_type: AddressType,
    ) -> Result<BleConnection> {
        info!("Connecting to {} ({})", address, address_type);
        let target = BDAddr::from(*address.as_bytes());

        let peripheral = self
            .adapter
            .peripherals()
            .await?
            .into_iter()
            .find(|p| p.address() == target)
            .ok_or(BlinkyError::PeripheralUnavailable(address))?;

        BleConnection::open(peripheral, address).await
    }
}

/// Peripheral an adapter event says was heard from.
async fn observed_id(event: CentralEvent) -> Option<PeripheralId> {
    match event {
        CentralEvent::DeviceDiscovered(id)
        | CentralEvent::DeviceUpdated(id)
        | CentralEvent::ManufacturerDataAdvertisement { id, .. }
        | CentralEvent::ServiceDataAdvertisement { id, .. }
        | CentralEvent::ServicesAdvertisement { id, .. } => Some(id),
        _ => None,
    }
}

/// Drain `items` for `window`, keeping each distinct item once in the order
/// it first appeared. Always takes the full window, even if the stream ends.
pub async fn collect_first_seen<S, T>(items: S, window: Duration) -> Vec<T>
where
    S: Stream<Item = T>,
    T: PartialEq,
{
    let mut items = pin!(items);
    let mut deadline = pin!(tokio::time::sleep(window));
    let mut seen = Vec::new();

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            item = items.next() => match item {
                Some(item) => {
                    if !seen.contains(&item) {
                        seen.push(item);
                    }
                }
                None => {
                    deadline.as_mut().await;
                    break;
                }
            },
        }
    }
    seen
}

/// Convert platform scan properties into a device with advertising records.
pub fn device_from_properties(props: &PeripheralProperties) -> DiscoveredDevice {
    let address_type = match props.address_type {
        Some(PlatformAddressType::Random) => AddressType::Random,
        Some(PlatformAddressType::Public) => AddressType::Public,
        None => AddressType::Public,
    };

    DiscoveredDevice {
        address: DeviceAddress::new(props.address.into_inner()),
        address_type,
        rssi: props.rssi,
        records: records_from_properties(props),
    }
}

fn record(ad: u8, value: String) -> AdvertisingRecord {
    AdvertisingRecord::new(ad, describe_ad_type(ad), value)
}

/// btleplug hands out decoded advertisement fields rather than raw AD
/// structures, so each field is mapped back to the AD type that carries it.
pub fn records_from_properties(props: &PeripheralProperties) -> Vec<AdvertisingRecord> {
    let mut records = Vec::new();

    if let Some(name) = &props.local_name {
        records.push(record(ad_type::COMPLETE_LOCAL_NAME, name.clone()));
    }
    if !props.services.is_empty() {
        records.push(record(
            ad_type::COMPLETE_128B_SERVICES,
            protocol::format_uuid_list(&props.services),
        ));
    }
    if let Some(tx_power) = props.tx_power_level {
        records.push(record(ad_type::TX_POWER, tx_power.to_string()));
    }

    let mut manufacturers: Vec<_> = props.manufacturer_data.iter().collect();
    manufacturers.sort_by_key(|(company, _)| **company);
    for (company, data) in manufacturers {
        records.push(record(
            ad_type::MANUFACTURER,
            protocol::format_manufacturer_data(*company, data),
        ));
    }

    if !props.service_data.is_empty() {
        records.push(record(
            ad_type::SERVICE_DATA_128B,
            protocol::format_service_data(&props.service_data),
        ));
    }

    records
}

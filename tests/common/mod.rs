//! Scripted in-memory radio for driving `BlinkySession` without hardware.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nordic_blinky::domain::models::{
    AddressType, AdvertisingRecord, Attribute, AttributeProperties, DeviceAddress,
    DiscoveredDevice,
};
use nordic_blinky::domain::settings::Settings;
use nordic_blinky::infrastructure::bluetooth::protocol::{self, ad_type, COMPLETE_LOCAL_NAME};
use nordic_blinky::infrastructure::bluetooth::transport::{Link, Radio};
use nordic_blinky::infrastructure::shutdown::ShutdownTrigger;
use nordic_blinky::{BlinkyError, Result};
use uuid::Uuid;

pub fn button_uuid() -> Uuid {
    Uuid::parse_str(protocol::BUTTON_CHAR_UUID).unwrap()
}

pub fn led_uuid() -> Uuid {
    Uuid::parse_str(protocol::LED_CHAR_UUID).unwrap()
}

pub fn lbs_uuid() -> Uuid {
    Uuid::parse_str(protocol::LBS_SERVICE_UUID).unwrap()
}

pub fn device(last: u8, name: Option<&str>) -> DiscoveredDevice {
    let mut records = vec![AdvertisingRecord::new(ad_type::FLAGS, "Flags", "06")];
    if let Some(name) = name {
        records.push(AdvertisingRecord::new(
            ad_type::COMPLETE_LOCAL_NAME,
            COMPLETE_LOCAL_NAME,
            name,
        ));
    }
    DiscoveredDevice {
        address: DeviceAddress::new([0xd8, 0xc2, 0xe6, 0x99, 0xb8, last]),
        address_type: AddressType::Random,
        rssi: Some(-40 - i16::from(last)),
        records,
    }
}

pub fn attribute(uuid: Uuid, read: bool, write: bool) -> Attribute {
    Attribute {
        uuid,
        service_uuid: lbs_uuid(),
        properties: AttributeProperties {
            read,
            write,
            ..Default::default()
        },
    }
}

/// The characteristics exposed by the Blinky firmware, surrounded by noise.
pub fn blinky_attributes() -> Vec<Attribute> {
    vec![
        attribute(Uuid::from_u128(0x2a00_0000_1000_8000_0080_5f9b_34fb), true, false),
        attribute(button_uuid(), true, false),
        attribute(led_uuid(), true, true),
        attribute(Uuid::from_u128(0xdead_beef), true, true),
    ]
}

pub fn settings(max_mirror_iterations: Option<u64>) -> Settings {
    Settings {
        scan_duration_secs: 0.01,
        max_mirror_iterations,
        ..Default::default()
    }
}

/// What the button returns once its script runs out.
pub enum Exhausted {
    Fail,
    Repeat,
}

/// How `connect` answers.
#[derive(Clone, Copy)]
pub enum ConnectBehavior {
    Succeed,
    Fail,
    /// Never returns, like a peripheral that vanished mid-connect.
    Hang,
}

#[derive(Default)]
pub struct Log {
    pub connects: Vec<(DeviceAddress, AddressType)>,
    pub reads: Vec<(Uuid, Vec<u8>)>,
    pub writes: Vec<(Uuid, Vec<u8>)>,
    pub disconnects: usize,
}

pub struct LinkState {
    attributes: Vec<Attribute>,
    button_script: Mutex<VecDeque<Vec<u8>>>,
    last_button: Mutex<Vec<u8>>,
    exhausted: Exhausted,
    /// Fired once this many button reads have happened.
    cancel_after: Mutex<Option<(usize, ShutdownTrigger)>>,
    /// Each write sleeps this long before completing.
    write_delay: Mutex<Option<Duration>>,
    /// The write with this 1-based index fails.
    fail_write: Mutex<Option<usize>>,
    write_attempts: Mutex<usize>,
    pub log: Arc<Mutex<Log>>,
}

pub struct ScriptedRadio {
    devices: Vec<DiscoveredDevice>,
    connect: ConnectBehavior,
    state: Arc<LinkState>,
}

pub struct ScriptedLink {
    state: Arc<LinkState>,
}

impl ScriptedRadio {
    pub fn new(
        devices: Vec<DiscoveredDevice>,
        attributes: Vec<Attribute>,
        button_script: Vec<Vec<u8>>,
        exhausted: Exhausted,
    ) -> Self {
        Self {
            devices,
            connect: ConnectBehavior::Succeed,
            state: Arc::new(LinkState {
                attributes,
                button_script: Mutex::new(button_script.into()),
                last_button: Mutex::new(vec![0x00]),
                exhausted,
                cancel_after: Mutex::new(None),
                write_delay: Mutex::new(None),
                fail_write: Mutex::new(None),
                write_attempts: Mutex::new(0),
                log: Arc::new(Mutex::new(Log::default())),
            }),
        }
    }

    pub fn connect_behavior(mut self, behavior: ConnectBehavior) -> Self {
        self.connect = behavior;
        self
    }

    pub fn slow_writes(self, delay: Duration) -> Self {
        *self.state.write_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn fail_write(self, nth: usize) -> Self {
        *self.state.fail_write.lock().unwrap() = Some(nth);
        self
    }

    pub fn cancel_after_reads(self, reads: usize, trigger: ShutdownTrigger) -> Self {
        *self.state.cancel_after.lock().unwrap() = Some((reads, trigger));
        self
    }

    pub fn log(&self) -> Arc<Mutex<Log>> {
        self.state.log.clone()
    }
}

#[async_trait]
impl Radio for ScriptedRadio {
    type Link = ScriptedLink;

    async fn scan(&self, _duration: Duration) -> Result<Vec<DiscoveredDevice>> {
        Ok(self.devices.clone())
    }

    async fn connect(
        &self,
        address: DeviceAddress,
        address_type: AddressType,
    ) -> Result<ScriptedLink> {
        self.state.log.lock().unwrap().connects.push((address, address_type));
        match self.connect {
            ConnectBehavior::Succeed => {}
            ConnectBehavior::Fail => return Err(BlinkyError::PeripheralUnavailable(address)),
            ConnectBehavior::Hang => std::future::pending::<()>().await,
        }
        if !self.devices.iter().any(|d| d.address == address) {
            return Err(BlinkyError::PeripheralUnavailable(address));
        }
        Ok(ScriptedLink {
            state: self.state.clone(),
        })
    }
}

#[async_trait]
impl Link for ScriptedLink {
    async fn characteristics(&self) -> Result<Vec<Attribute>> {
        Ok(self.state.attributes.clone())
    }

    async fn read(&self, attribute: &Attribute) -> Result<Vec<u8>> {
        let value = if attribute.uuid == button_uuid() {
            let next = self.state.button_script.lock().unwrap().pop_front();
            match (next, &self.state.exhausted) {
                (Some(value), _) => {
                    *self.state.last_button.lock().unwrap() = value.clone();
                    value
                }
                (None, Exhausted::Repeat) => self.state.last_button.lock().unwrap().clone(),
                (None, Exhausted::Fail) => {
                    return Err(BlinkyError::UnknownAttribute(attribute.uuid))
                }
            }
        } else {
            vec![0x00]
        };

        let reads = {
            let mut log = self.state.log.lock().unwrap();
            log.reads.push((attribute.uuid, value.clone()));
            log.reads.len()
        };
        let mut cancel = self.state.cancel_after.lock().unwrap();
        if cancel.as_ref().is_some_and(|(after, _)| reads >= *after) {
            if let Some((_, trigger)) = cancel.take() {
                trigger.trigger();
            }
        }
        Ok(value)
    }

    async fn write(&self, attribute: &Attribute, value: &[u8]) -> Result<()> {
        let delay = *self.state.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let attempt = {
            let mut attempts = self.state.write_attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        if *self.state.fail_write.lock().unwrap() == Some(attempt) {
            return Err(BlinkyError::UnknownAttribute(attribute.uuid));
        }

        self.state
            .log
            .lock()
            .unwrap()
            .writes
            .push((attribute.uuid, value.to_vec()));
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.state.log.lock().unwrap().disconnects += 1;
        Ok(())
    }
}

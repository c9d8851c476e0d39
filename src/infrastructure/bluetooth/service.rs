//! Blinky Session Module
//!
//! Coordinates one run of the program: scan, match, connect, resolve the
//! button and LED characteristics, mirror, disconnect.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::matcher;
use crate::domain::models::{
    AppEvent, Attribute, ConnectionStatus, MessageSeverity, ResolvedAttributes, SessionOutcome,
    StatusMessage,
};
use crate::domain::settings::Settings;
use crate::error::Result;
use crate::infrastructure::bluetooth::transport::{Link, Radio};
use crate::infrastructure::shutdown::ShutdownSignal;

/// Keep the first attribute per UUID; everything else is ignored.
pub fn resolve_attributes(
    attributes: &[Attribute],
    button_uuid: Uuid,
    led_uuid: Uuid,
) -> ResolvedAttributes {
    let first = |uuid: Uuid| attributes.iter().find(|a| a.uuid == uuid).cloned();
    ResolvedAttributes {
        button: first(button_uuid),
        led: first(led_uuid),
    }
}

pub struct BlinkySession<R: Radio> {
    radio: R,
    settings: Settings,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl<R: Radio> BlinkySession<R> {
    pub fn new(
        radio: R,
        settings: Settings,
        event_sender: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            radio,
            settings,
            event_sender,
        }
    }

    /// Run every phase in order. Scan, connect, enumeration and each button
    /// read give way to `shutdown`; a write is always finished once its read
    /// has returned. Connect, read and write failures are returned as-is and
    /// the link is left to the platform in that case.
    pub async fn run(&self, mut shutdown: ShutdownSignal) -> Result<SessionOutcome> {
        let button_uuid = self.settings.button_uuid()?;
        let led_uuid = self.settings.led_uuid()?;
        let scan_duration = self.settings.scan_duration()?;
        let target_name = self.settings.target_name.as_str();

        // Discovery
        let Some(devices) = shutdown
            .run_until_cancelled(self.radio.scan(scan_duration))
            .await
        else {
            info!("Cancelled while scanning");
            return Ok(SessionOutcome::Cancelled);
        };
        let devices = devices?;
        let Some(device) = matcher::find_target(&devices, target_name) else {
            info!("No device advertising '{}' among {}", target_name, devices.len());
            return Ok(SessionOutcome::DeviceNotFound);
        };
        self.emit(AppEvent::DeviceFound {
            name: target_name.to_string(),
            address: device.address,
            rssi: device.rssi,
        });

        // Connect
        self.emit(AppEvent::ConnectionStatus(ConnectionStatus::Connecting));
        let Some(link) = shutdown
            .run_until_cancelled(self.radio.connect(device.address, device.address_type))
            .await
        else {
            info!("Cancelled while connecting to {}", device.address);
            self.emit(AppEvent::ConnectionStatus(ConnectionStatus::Disconnected));
            return Ok(SessionOutcome::Cancelled);
        };
        let link = link?;
        self.emit(AppEvent::ConnectionStatus(ConnectionStatus::Connected));

        let outcome = self
            .use_link(&link, button_uuid, led_uuid, &mut shutdown)
            .await?;

        // Teardown
        link.disconnect().await?;
        self.emit(AppEvent::ConnectionStatus(ConnectionStatus::Disconnected));
        Ok(outcome)
    }

    /// Enumerate, resolve and, when both characteristics exist, mirror.
    async fn use_link(
        &self,
        link: &R::Link,
        button_uuid: Uuid,
        led_uuid: Uuid,
        shutdown: &mut ShutdownSignal,
    ) -> Result<SessionOutcome> {
        let Some(attributes) = shutdown.run_until_cancelled(link.characteristics()).await else {
            info!("Cancelled while enumerating characteristics");
            return Ok(SessionOutcome::Cancelled);
        };
        let attributes = attributes?;

        let resolved = resolve_attributes(&attributes, button_uuid, led_uuid);
        for attribute in resolved.button.iter().chain(resolved.led.iter()) {
            self.emit(AppEvent::AttributeFound {
                uuid: attribute.uuid,
                properties: attribute.properties,
            });
        }
        self.emit(AppEvent::AttributesResolved {
            button: resolved.button.as_ref().map(|a| a.uuid),
            led: resolved.led.as_ref().map(|a| a.uuid),
        });

        match resolved.both() {
            Some((button, led)) => {
                self.log("Press the button to light the LED.", MessageSeverity::Info);
                self.mirror(link, button, led, shutdown).await
            }
            None => {
                warn!("Button or LED characteristic missing, skipping mirror loop");
                self.log(
                    "Button or LED characteristic not found, nothing to mirror.",
                    MessageSeverity::Warning,
                );
                Ok(SessionOutcome::AttributesMissing)
            }
        }
    }

    /// Copy the button value into the LED, one write per read, until
    /// cancelled or the configured iteration limit is reached.
    async fn mirror(
        &self,
        link: &R::Link,
        button: &Attribute,
        led: &Attribute,
        shutdown: &mut ShutdownSignal,
    ) -> Result<SessionOutcome> {
        let limit = self.settings.max_mirror_iterations;
        let mut iterations: u64 = 0;
        let mut last: Option<Vec<u8>> = None;

        loop {
            if limit.is_some_and(|max| iterations >= max) {
                debug!("Mirror limit of {} iterations reached", iterations);
                return Ok(SessionOutcome::IterationLimitReached);
            }

            // Only the read is abandoned on shutdown; a value already read
            // is always written.
            let Some(value) = shutdown.run_until_cancelled(link.read(button)).await else {
                info!("Mirror loop cancelled after {} iterations", iterations);
                return Ok(SessionOutcome::Cancelled);
            };
            let value = value?;
            link.write(led, &value).await?;
            iterations += 1;

            if last.as_deref() != Some(value.as_slice()) {
                self.emit(AppEvent::ValueMirrored(value.clone()));
                last = Some(value);
            }
        }
    }

    fn emit(&self, event: AppEvent) {
        let _ = self.event_sender.send(event);
    }

    fn log(&self, message: &str, severity: MessageSeverity) {
        self.emit(AppEvent::LogMessage(StatusMessage {
            message: message.to_string(),
            severity,
        }));
    }
}

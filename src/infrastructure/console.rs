//! Console reporter
//!
//! Turns [`AppEvent`]s into the lines a user sees on stdout.

use tokio::sync::mpsc;

use crate::domain::models::{AppEvent, ConnectionStatus, MessageSeverity};
use crate::infrastructure::bluetooth::protocol::format_value;

/// Render one event, or `None` for events that have no console line.
pub fn render(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::LogMessage(status) => Some(match status.severity {
            MessageSeverity::Info => status.message.clone(),
            MessageSeverity::Warning => format!("Warning: {}", status.message),
        }),
        AppEvent::DeviceFound {
            name,
            address,
            rssi,
        } => {
            let rssi = rssi.map_or_else(|| "unknown".to_string(), |r| format!("{} dB", r));
            Some(format!(
                "Device with name '{}' found! Device address: {}. RSSI: {}",
                name, address, rssi
            ))
        }
        AppEvent::ConnectionStatus(ConnectionStatus::Connected) => {
            Some("=== Characteristics ===".to_string())
        }
        AppEvent::ConnectionStatus(_) => None,
        AppEvent::AttributeFound { uuid, properties } => {
            Some(format!("UUID: {}. Properties: {}", uuid, properties))
        }
        AppEvent::AttributesResolved { button, led } => {
            let show = |u: &Option<uuid::Uuid>| u.map_or("None".to_string(), |u| u.to_string());
            Some(format!(
                "BTN characteristic: {}. LED characteristic: {}",
                show(button),
                show(led)
            ))
        }
        AppEvent::ValueMirrored(value) => Some(format!("LED <- {}", format_value(value))),
    }
}

/// Print events until every sender is dropped.
pub async fn run_reporter(mut events: mpsc::UnboundedReceiver<AppEvent>) {
    while let Some(event) = events.recv().await {
        if let Some(line) = render(&event) {
            println!("{}", line);
        }
    }
}

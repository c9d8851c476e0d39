//! Nordic LED Button Service protocol
//!
//! UUIDs and names used by the Blinky example firmware, plus the advertising
//! data type table used to describe scan records.

use std::collections::HashMap;

use uuid::Uuid;

/// Name advertised by the Blinky firmware.
pub const TARGET_NAME: &str = "Nordic_Blinky";

/// LED Button Service UUID
pub const LBS_SERVICE_UUID: &str = "00001523-1212-efde-1523-785feabcd123";

/// Button state characteristic (read/notify)
pub const BUTTON_CHAR_UUID: &str = "00001524-1212-efde-1523-785feabcd123";

/// LED state characteristic (read/write)
pub const LED_CHAR_UUID: &str = "00001525-1212-efde-1523-785feabcd123";

/// Default scan window in seconds
pub const SCAN_DURATION_SECS: f64 = 1.0;

pub const COMPLETE_LOCAL_NAME: &str = "Complete Local Name";
pub const SHORT_LOCAL_NAME: &str = "Short Local Name";

/// Advertising data type identifiers (Bluetooth Assigned Numbers, 2.3)
pub mod ad_type {
    pub const FLAGS: u8 = 0x01;
    pub const INCOMPLETE_16B_SERVICES: u8 = 0x02;
    pub const COMPLETE_16B_SERVICES: u8 = 0x03;
    pub const INCOMPLETE_32B_SERVICES: u8 = 0x04;
    pub const COMPLETE_32B_SERVICES: u8 = 0x05;
    pub const INCOMPLETE_128B_SERVICES: u8 = 0x06;
    pub const COMPLETE_128B_SERVICES: u8 = 0x07;
    pub const SHORT_LOCAL_NAME: u8 = 0x08;
    pub const COMPLETE_LOCAL_NAME: u8 = 0x09;
    pub const TX_POWER: u8 = 0x0A;
    pub const SOLICITED_16B_SERVICES: u8 = 0x14;
    pub const SOLICITED_128B_SERVICES: u8 = 0x15;
    pub const SERVICE_DATA_16B: u8 = 0x16;
    pub const APPEARANCE: u8 = 0x19;
    pub const SOLICITED_32B_SERVICES: u8 = 0x1F;
    pub const SERVICE_DATA_32B: u8 = 0x20;
    pub const SERVICE_DATA_128B: u8 = 0x21;
    pub const MANUFACTURER: u8 = 0xFF;
}

/// Human-readable description of an advertising data type.
pub fn describe_ad_type(ad: u8) -> &'static str {
    match ad {
        ad_type::FLAGS => "Flags",
        ad_type::INCOMPLETE_16B_SERVICES => "Incomplete 16b Services",
        ad_type::COMPLETE_16B_SERVICES => "Complete 16b Services",
        ad_type::INCOMPLETE_32B_SERVICES => "Incomplete 32b Services",
        ad_type::COMPLETE_32B_SERVICES => "Complete 32b Services",
        ad_type::INCOMPLETE_128B_SERVICES => "Incomplete 128b Services",
        ad_type::COMPLETE_128B_SERVICES => "Complete 128b Services",
        ad_type::SHORT_LOCAL_NAME => SHORT_LOCAL_NAME,
        ad_type::COMPLETE_LOCAL_NAME => COMPLETE_LOCAL_NAME,
        ad_type::TX_POWER => "Tx Power",
        ad_type::SOLICITED_16B_SERVICES => "16b Service Solicitation",
        ad_type::SOLICITED_128B_SERVICES => "128b Service Solicitation",
        ad_type::SERVICE_DATA_16B => "16b Service Data",
        ad_type::APPEARANCE => "Appearance",
        ad_type::SOLICITED_32B_SERVICES => "32b Service Solicitation",
        ad_type::SERVICE_DATA_32B => "32b Service Data",
        ad_type::SERVICE_DATA_128B => "128b Service Data",
        ad_type::MANUFACTURER => "Manufacturer",
        _ => "Unknown",
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn format_uuid_list(uuids: &[Uuid]) -> String {
    uuids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Manufacturer data rendered as company id (little endian on air) followed
/// by the payload.
pub fn format_manufacturer_data(company_id: u16, data: &[u8]) -> String {
    let mut raw = company_id.to_le_bytes().to_vec();
    raw.extend_from_slice(data);
    to_hex(&raw)
}

/// Service data rendered as `<uuid>:<hex payload>`, entries sorted by UUID so
/// the output does not depend on map iteration order.
pub fn format_service_data(data: &HashMap<Uuid, Vec<u8>>) -> String {
    let mut entries: Vec<_> = data.iter().collect();
    entries.sort_by_key(|(uuid, _)| **uuid);
    entries
        .into_iter()
        .map(|(uuid, payload)| format!("{}:{}", uuid, to_hex(payload)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Short form of a value for console output, e.g. `01` or `0a0b`.
pub fn format_value(value: &[u8]) -> String {
    if value.is_empty() {
        "<empty>".to_string()
    } else {
        to_hex(value)
    }
}

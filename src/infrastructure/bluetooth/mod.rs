//! Bluetooth Module
//!
//! BLE central side of the Blinky demo.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     BlinkySession                        │
//! │   (scan → match → connect → resolve → mirror → close)    │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │ Radio / Link traits
//!         ┌─────────────┴─────────────┐
//!         ▼                           ▼
//! ┌───────────────┐          ┌────────────────┐
//! │  BleScanner   │ connect  │ BleConnection  │
//! │  (Radio)      │ ───────▶ │ (Link)         │
//! └───────────────┘          └────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`protocol`] - LED Button Service UUIDs and advertising data types
//! - [`transport`] - `Radio` and `Link` traits
//! - [`scanner`] - btleplug discovery and connect
//! - [`connection`] - btleplug GATT access
//! - [`service`] - Session coordinator

pub mod connection;
pub mod protocol;
pub mod scanner;
pub mod service;
pub mod transport;

pub use scanner::BleScanner;
pub use service::BlinkySession;

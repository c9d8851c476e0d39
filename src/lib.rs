//! Mirror the button of a Nordic Blinky peripheral onto its LED over BLE.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{BlinkyError, Result};

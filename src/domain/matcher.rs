//! Target device selection.

use crate::domain::models::DiscoveredDevice;
use crate::infrastructure::bluetooth::protocol::COMPLETE_LOCAL_NAME;

/// Return the first device, in scan order, advertising `target_name` as its
/// complete local name.
pub fn find_target<'a>(
    devices: &'a [DiscoveredDevice],
    target_name: &str,
) -> Option<&'a DiscoveredDevice> {
    devices.iter().find(|device| {
        device
            .records
            .iter()
            .any(|r| r.description == COMPLETE_LOCAL_NAME && r.value == target_name)
    })
}

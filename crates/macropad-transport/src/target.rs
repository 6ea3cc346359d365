//! USB identity of the device

use serde::{Deserialize, Serialize};

/// MacroPad vendor id
pub const VENDOR_ID: u16 = 0x5AA6;
/// MacroPad product id
pub const PRODUCT_ID: u16 = 0x60E1;
/// Interface carrying the configuration channel
pub const INTERFACE_NUMBER: u8 = 1;
/// Bulk OUT endpoint number
pub const ENDPOINT_OUT: u8 = 2;
/// Bulk IN endpoint number
pub const ENDPOINT_IN: u8 = 2;
/// Configuration selected when the device has none active
pub const DEFAULT_CONFIGURATION: u8 = 1;

/// Which device, interface and endpoints to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsbTarget {
    /// USB vendor id
    pub vendor_id: u16,
    /// USB product id
    pub product_id: u16,
    /// Interface number to claim
    pub interface: u8,
    /// OUT endpoint number (without direction bit)
    pub endpoint_out: u8,
    /// IN endpoint number (without direction bit)
    pub endpoint_in: u8,
}

impl UsbTarget {
    /// OUT endpoint address
    pub fn out_address(&self) -> u8 {
        self.endpoint_out & 0x7F
    }

    /// IN endpoint address (direction bit set)
    pub fn in_address(&self) -> u8 {
        self.endpoint_in | 0x80
    }

    /// Whether a device with these ids matches
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl Default for UsbTarget {
    fn default() -> Self {
        Self {
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
            interface: INTERFACE_NUMBER,
            endpoint_out: ENDPOINT_OUT,
            endpoint_in: ENDPOINT_IN,
        }
    }
}

impl std::fmt::Display for UsbTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} interface {}",
            self.vendor_id, self.product_id, self.interface
        )
    }
}

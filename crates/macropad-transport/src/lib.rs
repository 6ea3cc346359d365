//! USB bulk transport abstraction for MacroPad devices
//!
//! The request engine talks to a [`Transport`] trait object so the same code
//! drives real hardware and scripted test doubles.
//!
//! # Architecture
//!
//! - [`Transport`]: one opened, claimed bulk interface
//! - [`TransportPort`]: discovers and opens a device matching a [`UsbTarget`]
//! - [`usb`]: nusb backend (feature `usb`, on by default)
//! - [`mock`]: scripted in-memory transport (feature `mock`)
//! - [`error`]: transport error types

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
#[cfg(any(test, feature = "mock"))]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;
pub mod target;
#[cfg(feature = "usb")]
#[cfg_attr(docsrs, doc(cfg(feature = "usb")))]
pub mod usb;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{TransportError, TransportResult};
pub use target::UsbTarget;

/// Direction of a bulk endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to device
    Out,
    /// Device to host
    In,
}

/// Result of one bulk IN transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes received; may be empty
    Data(Vec<u8>),
    /// Endpoint halted; clear the halt and retry
    Stall,
    /// Device sent more than the requested length
    Babble,
}

/// Identity of an opened device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// USB vendor id
    pub vendor_id: u16,
    /// USB product id
    pub product_id: u16,
    /// Product string descriptor
    pub product_name: Option<String>,
    /// Serial number string descriptor
    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Create info with only vendor and product ids
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            product_name: None,
            serial_number: None,
        }
    }
}

/// An opened device with a claimed bulk interface
#[async_trait]
pub trait Transport: Send {
    /// Write all of `data` to the OUT endpoint, returning bytes written
    async fn write(&mut self, data: &[u8]) -> TransportResult<usize>;

    /// Read up to `max_len` bytes from the IN endpoint
    async fn read(&mut self, max_len: usize) -> TransportResult<ReadOutcome>;

    /// Clear a halt condition on one endpoint
    async fn clear_halt(&mut self, direction: Direction) -> TransportResult<()>;

    /// Release the interface and close the device
    async fn close(&mut self) -> TransportResult<()>;

    /// Identity of the opened device
    fn device_info(&self) -> &DeviceInfo;
}

/// Opens devices matching a target
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// Find, open, configure and claim the target interface
    async fn open(&self, target: &UsbTarget) -> TransportResult<Box<dyn Transport>>;
}

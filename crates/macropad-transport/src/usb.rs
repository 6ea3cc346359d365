//! nusb-backed bulk transport

use async_trait::async_trait;
use nusb::Interface;
use nusb::transfer::{RequestBuffer, TransferError};
use tracing::{debug, info, trace, warn};

use crate::error::{TransportError, TransportResult};
use crate::target::{DEFAULT_CONFIGURATION, UsbTarget};
use crate::{DeviceInfo, Direction, ReadOutcome, Transport, TransportPort};

/// Opens devices through the host USB stack
#[derive(Debug, Clone, Copy, Default)]
pub struct UsbPort;

impl UsbPort {
    /// Create a port
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportPort for UsbPort {
    async fn open(&self, target: &UsbTarget) -> TransportResult<Box<dyn Transport>> {
        let transport = UsbTransport::open(target)?;
        Ok(Box::new(transport))
    }
}

/// A claimed bulk interface on a real device
pub struct UsbTransport {
    interface: Option<Interface>,
    target: UsbTarget,
    info: DeviceInfo,
}

impl std::fmt::Debug for UsbTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbTransport")
            .field("target", &self.target)
            .field("info", &self.info)
            .field("open", &self.interface.is_some())
            .finish()
    }
}

impl UsbTransport {
    /// Find the target device, select a configuration if none is active and
    /// claim the interface
    pub fn open(target: &UsbTarget) -> TransportResult<Self> {
        info!(%target, "searching for device");
        let device_info = nusb::list_devices()
            .map_err(|e| TransportError::Io(format!("USB enumeration: {e}")))?
            .find(|d| target.matches(d.vendor_id(), d.product_id()))
            .ok_or_else(|| TransportError::not_found(target.vendor_id, target.product_id))?;

        let info = DeviceInfo {
            vendor_id: device_info.vendor_id(),
            product_id: device_info.product_id(),
            product_name: device_info.product_string().map(str::to_string),
            serial_number: device_info.serial_number().map(str::to_string),
        };
        debug!(
            bus = device_info.bus_number(),
            address = device_info.device_address(),
            product = ?info.product_name,
            "device found"
        );

        let device = device_info
            .open()
            .map_err(|e| TransportError::OpenFailed(e.to_string()))?;

        if device.active_configuration().is_err() {
            debug!(configuration = DEFAULT_CONFIGURATION, "no active configuration, selecting one");
            device
                .set_configuration(DEFAULT_CONFIGURATION)
                .map_err(|e| TransportError::ConfigurationFailed {
                    configuration: DEFAULT_CONFIGURATION,
                    reason: e.to_string(),
                })?;
        }

        let interface = device.claim_interface(target.interface).map_err(|e| {
            TransportError::ClaimFailed {
                interface: target.interface,
                reason: e.to_string(),
            }
        })?;
        info!(interface = target.interface, "interface claimed");

        Ok(Self {
            interface: Some(interface),
            target: *target,
            info,
        })
    }

    fn interface(&self) -> TransportResult<&Interface> {
        self.interface.as_ref().ok_or(TransportError::Closed)
    }
}

fn map_transfer_error(error: TransferError) -> TransportError {
    match error {
        TransferError::Disconnected => TransportError::Disconnected,
        TransferError::Cancelled => TransportError::Cancelled,
        other => TransportError::Io(other.to_string()),
    }
}

#[async_trait]
impl Transport for UsbTransport {
    async fn write(&mut self, data: &[u8]) -> TransportResult<usize> {
        let endpoint = self.target.out_address();
        let completion = self.interface()?.bulk_out(endpoint, data.to_vec()).await;
        completion.status.map_err(map_transfer_error)?;

        let written = completion.data.actual_length();
        trace!(endpoint, written, "bulk out complete");
        if written < data.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(written)
    }

    async fn read(&mut self, max_len: usize) -> TransportResult<ReadOutcome> {
        let endpoint = self.target.in_address();
        let completion = self
            .interface()?
            .bulk_in(endpoint, RequestBuffer::new(max_len))
            .await;

        match completion.status {
            Ok(()) if completion.data.len() > max_len => Ok(ReadOutcome::Babble),
            Ok(()) => {
                trace!(endpoint, len = completion.data.len(), "bulk in complete");
                Ok(ReadOutcome::Data(completion.data))
            }
            Err(TransferError::Stall) => {
                warn!(endpoint, "IN endpoint stalled");
                Ok(ReadOutcome::Stall)
            }
            Err(e) => Err(map_transfer_error(e)),
        }
    }

    async fn clear_halt(&mut self, direction: Direction) -> TransportResult<()> {
        let endpoint = match direction {
            Direction::In => self.target.in_address(),
            Direction::Out => self.target.out_address(),
        };
        self.interface()?
            .clear_halt(endpoint)
            .map_err(|e| TransportError::ClearHaltFailed {
                endpoint,
                reason: e.to_string(),
            })?;
        debug!(endpoint, "halt cleared");
        Ok(())
    }

    async fn close(&mut self) -> TransportResult<()> {
        if self.interface.take().is_some() {
            info!(interface = self.target.interface, "interface released");
        }
        Ok(())
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.info
    }
}

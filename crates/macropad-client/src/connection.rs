//! Ownership of the opened transport

use serde::Serialize;
use tracing::{info, warn};

use macropad_protocol::PROTOCOL_VERSION;
use macropad_transport::{Transport, TransportPort, UsbTarget};

use crate::error::{ClientError, ClientResult};

/// Lifecycle of a device connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No transport open
    #[default]
    Disconnected,
    /// Opening and claiming the interface
    Connecting,
    /// Transport open and claimed
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// What `connect` reports about the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceConnectionInfo {
    /// Product string, or a fallback when the device has none
    pub product_name: String,
    /// Serial number string, if present
    pub serial_number: Option<String>,
    /// Protocol version spoken by this host
    pub firmware_version: String,
}

/// Exclusive owner of one transport handle
pub struct Connection {
    state: ConnectionState,
    transport: Option<Box<dyn Transport>>,
    info: Option<DeviceConnectionInfo>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    /// A closed connection
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            transport: None,
            info: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether a transport is open
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Info for the open device
    pub fn info(&self) -> Option<&DeviceConnectionInfo> {
        self.info.as_ref()
    }

    /// Open the target through `port`, or return the current info when
    /// already connected
    pub async fn open(
        &mut self,
        port: &dyn TransportPort,
        target: &UsbTarget,
    ) -> ClientResult<DeviceConnectionInfo> {
        if let (ConnectionState::Connected, Some(info)) = (self.state, &self.info) {
            return Ok(info.clone());
        }

        self.state = ConnectionState::Connecting;
        info!(target = %target, "connecting to device");

        let transport = match port.open(target).await {
            Ok(transport) => transport,
            Err(error) => {
                self.state = ConnectionState::Disconnected;
                return Err(error.into());
            }
        };

        let device = transport.device_info();
        let info = DeviceConnectionInfo {
            product_name: device
                .product_name
                .clone()
                .unwrap_or_else(|| "MacroPad".to_string()),
            serial_number: device.serial_number.clone(),
            firmware_version: PROTOCOL_VERSION.to_hex(),
        };
        info!(
            product = %info.product_name,
            serial = ?info.serial_number,
            "device connected"
        );

        self.transport = Some(transport);
        self.info = Some(info.clone());
        self.state = ConnectionState::Connected;
        Ok(info)
    }

    /// Borrow the transport for one request
    pub fn transport(&mut self) -> ClientResult<&mut dyn Transport> {
        match self.transport.as_deref_mut() {
            Some(transport) if self.state == ConnectionState::Connected => Ok(transport),
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Close the transport; returns false when nothing was open
    pub async fn close(&mut self) -> bool {
        self.state = ConnectionState::Disconnected;
        self.info = None;
        let Some(mut transport) = self.transport.take() else {
            return false;
        };
        if let Err(error) = transport.close().await {
            warn!(error = %error, "error while closing device");
        }
        info!("device disconnected");
        true
    }
}

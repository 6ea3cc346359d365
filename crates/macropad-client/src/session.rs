//! Device session: connection lifecycle plus the configuration commands
//!
//! A [`DeviceSession`] is the single owner of a device connection. Every
//! operation takes `&self`; an operation started while another is in
//! flight fails with [`ClientError::Busy`] instead of interleaving on the
//! transport.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tracing::{debug, info, warn};

use macropad_config::{ConfigUpdate, DeviceConfig};
use macropad_protocol::{Command, CommandKind, ProtocolHeader, Response};
use macropad_transport::TransportPort;

use crate::api::ApiResult;
use crate::config::ClientConfig;
use crate::connection::{Connection, ConnectionState, DeviceConnectionInfo};
use crate::debug_log::DebugLog;
use crate::engine::{RequestEngine, expect_ack, expect_config};
use crate::error::{ClientError, ClientResult};

/// Message returned by `disconnect` when a device was open
pub const DISCONNECTED_MESSAGE: &str = "Device disconnected.";
/// Message returned by `disconnect` when nothing was open
pub const NOT_CONNECTED_MESSAGE: &str = "Device was not connected.";

struct SessionInner {
    connection: Connection,
    engine: RequestEngine,
}

#[derive(Debug, Default)]
struct SessionStatus {
    state: ConnectionState,
    info: Option<DeviceConnectionInfo>,
    last_error: Option<String>,
    cached_config: Option<DeviceConfig>,
}

/// Connection to one MacroPad and the operations it supports
pub struct DeviceSession {
    port: Arc<dyn TransportPort>,
    config: ClientConfig,
    inner: AsyncMutex<SessionInner>,
    status: Mutex<SessionStatus>,
    log: DebugLog,
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl DeviceSession {
    /// Create a disconnected session opening devices through `port`
    pub fn new(port: Arc<dyn TransportPort>, config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let log = DebugLog::new(config.debug_log_capacity);
        let engine = RequestEngine::new(&config).with_debug_log(log.clone());
        Ok(Self {
            port,
            config,
            inner: AsyncMutex::new(SessionInner {
                connection: Connection::new(),
                engine,
            }),
            status: Mutex::new(SessionStatus::default()),
            log,
        })
    }

    /// Create a session backed by real USB hardware
    #[cfg(feature = "usb")]
    #[cfg_attr(docsrs, doc(cfg(feature = "usb")))]
    pub fn usb(config: ClientConfig) -> ClientResult<Self> {
        Self::new(Arc::new(macropad_transport::usb::UsbPort::new()), config)
    }

    /// Session settings
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.status.lock().state
    }

    /// Whether a device is open
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Info reported by the last successful connect
    pub fn connection_info(&self) -> Option<DeviceConnectionInfo> {
        self.status.lock().info.clone()
    }

    /// Message of the most recent failure, cleared when the next operation starts
    pub fn last_error(&self) -> Option<String> {
        self.status.lock().last_error.clone()
    }

    /// Configuration from the most recent successful read
    pub fn cached_config(&self) -> Option<DeviceConfig> {
        self.status.lock().cached_config.clone()
    }

    /// Log of raw payloads, newest first
    pub fn debug_log(&self) -> &DebugLog {
        &self.log
    }

    /// Open the device, or report the open device
    pub async fn connect(&self) -> ApiResult<DeviceConnectionInfo> {
        self.try_connect().await.into()
    }

    /// Close the device
    pub async fn disconnect(&self) -> ApiResult<String> {
        self.try_disconnect().await.into()
    }

    /// Read the device configuration
    pub async fn get_config(&self) -> ApiResult<DeviceConfig> {
        self.try_get_config().await.into()
    }

    /// Write a full or partial configuration. A full configuration also
    /// deletes widgets it drops from the last fetched one.
    pub async fn set_config(&self, update: impl Into<ConfigUpdate>) -> ApiResult<bool> {
        self.try_set_config(update).await.into()
    }

    /// Restore the factory configuration
    pub async fn reset_config(&self) -> ApiResult<bool> {
        self.try_reset_config().await.into()
    }

    /// Reboot the device; the connection is closed afterwards
    pub async fn reboot(&self) -> ApiResult<bool> {
        self.try_reboot().await.into()
    }

    /// [`connect`](Self::connect) returning a typed error
    pub async fn try_connect(&self) -> ClientResult<DeviceConnectionInfo> {
        let mut inner = self.begin()?;
        let already_open = inner.connection.is_connected();
        if !already_open {
            self.set_state(ConnectionState::Connecting);
        }
        let result = inner
            .connection
            .open(self.port.as_ref(), &self.config.target)
            .await;

        match &result {
            Ok(info) => {
                if !already_open {
                    inner.engine = RequestEngine::new(&self.config).with_debug_log(self.log.clone());
                }
                let mut status = self.status.lock();
                status.state = ConnectionState::Connected;
                status.info = Some(info.clone());
            }
            Err(_) => self.set_state(ConnectionState::Disconnected),
        }
        self.finish(result)
    }

    /// [`disconnect`](Self::disconnect) returning a typed error.
    ///
    /// Waits for an in-flight request to finish or reach its deadline
    /// rather than failing as busy.
    pub async fn try_disconnect(&self) -> ClientResult<String> {
        let mut inner = self.inner.lock().await;
        self.status.lock().last_error = None;
        let was_open = inner.connection.close().await;
        self.mark_disconnected();

        let message = if was_open {
            DISCONNECTED_MESSAGE
        } else {
            debug!("disconnect requested with no open device");
            NOT_CONNECTED_MESSAGE
        };
        self.finish(Ok(message.to_string()))
    }

    /// [`get_config`](Self::get_config) returning a typed error
    pub async fn try_get_config(&self) -> ClientResult<DeviceConfig> {
        let mut inner = self.begin()?;
        let result = self.fetch_config(&mut inner).await;
        self.finish(result)
    }

    /// [`set_config`](Self::set_config) returning a typed error
    pub async fn try_set_config(&self, update: impl Into<ConfigUpdate>) -> ClientResult<bool> {
        let update = update.into();
        let mut inner = self.begin()?;
        let baseline = self.cached_config();
        let wire = update.to_wire_from(baseline.as_ref());
        let result = self
            .round_trip(&mut inner, |header| Command::set_config(header, wire))
            .await
            .and_then(|response| expect_ack(CommandKind::SetConfig, response));

        let result = match result {
            Ok(ack) => {
                info!(message = %ack.message, "configuration written");
                self.refresh_after_write(&mut inner).await;
                Ok(true)
            }
            Err(error) => Err(error),
        };
        self.finish(result)
    }

    /// [`reset_config`](Self::reset_config) returning a typed error
    pub async fn try_reset_config(&self) -> ClientResult<bool> {
        let mut inner = self.begin()?;
        let result = self
            .round_trip(&mut inner, Command::reset_config)
            .await
            .and_then(|response| expect_ack(CommandKind::ResetConfig, response));

        let result = match result {
            Ok(_) => {
                info!("configuration reset to defaults");
                self.refresh_after_write(&mut inner).await;
                Ok(true)
            }
            Err(error) => Err(error),
        };
        self.finish(result)
    }

    /// [`reboot`](Self::reboot) returning a typed error.
    ///
    /// The device drops off the bus after acknowledging, so the connection
    /// is closed whether or not the command succeeded.
    pub async fn try_reboot(&self) -> ClientResult<bool> {
        let mut inner = self.begin()?;
        let result = self
            .round_trip(&mut inner, Command::reboot)
            .await
            .and_then(|response| expect_ack(CommandKind::Reboot, response));

        if inner.connection.close().await {
            info!("connection closed after reboot");
        }
        self.mark_disconnected();
        self.finish(result.map(|_| true))
    }

    fn begin(&self) -> ClientResult<MutexGuard<'_, SessionInner>> {
        let guard = self.inner.try_lock().map_err(|e| {
            debug!(reason = %e, "rejecting request while another is in flight");
            self.record_error(&ClientError::Busy);
            ClientError::Busy
        })?;
        self.status.lock().last_error = None;
        Ok(guard)
    }

    async fn fetch_config(&self, inner: &mut SessionInner) -> ClientResult<DeviceConfig> {
        let response = self.round_trip(inner, Command::get_config).await?;
        let body = expect_config(response)?;
        let config = DeviceConfig::from_wire(body.config);
        debug!(
            mappings = config.mappings.len(),
            widgets = config.widgets.len(),
            "configuration read"
        );
        self.status.lock().cached_config = Some(config.clone());
        Ok(config)
    }

    async fn refresh_after_write(&self, inner: &mut SessionInner) {
        if let Err(error) = self.fetch_config(inner).await {
            warn!(error = %error, "failed to refresh configuration after write");
            self.record_error(&error);
        }
    }

    async fn round_trip(
        &self,
        inner: &mut SessionInner,
        build: impl FnOnce(ProtocolHeader) -> Command,
    ) -> ClientResult<Response> {
        let SessionInner { connection, engine } = inner;
        let transport = connection.transport()?;
        let command = build(engine.next_header());
        let result = engine.send(transport, &command).await;

        if let Err(error) = &result
            && error.is_connection_loss()
        {
            warn!(error = %error, command = %command.kind(), "connection lost");
            connection.close().await;
            self.mark_disconnected();
        }
        result
    }

    fn set_state(&self, state: ConnectionState) {
        self.status.lock().state = state;
    }

    fn mark_disconnected(&self) {
        let mut status = self.status.lock();
        status.state = ConnectionState::Disconnected;
        status.info = None;
        status.cached_config = None;
    }

    fn record_error(&self, error: &ClientError) {
        self.status.lock().last_error = Some(error.to_string());
    }

    fn finish<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(error) = &result {
            self.record_error(error);
        }
        result
    }
}

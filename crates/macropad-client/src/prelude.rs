//! Prelude module for convenient imports

pub use crate::api::ApiResult;
pub use crate::config::{ClientConfig, ClientConfigBuilder};
pub use crate::connection::{ConnectionState, DeviceConnectionInfo};
pub use crate::debug_log::{DebugEntry, DebugLog, LogDirection};
pub use crate::engine::{RequestEngine, expect_ack, expect_config};
pub use crate::error::{ClientError, ClientResult};
pub use crate::session::{DISCONNECTED_MESSAGE, DeviceSession, NOT_CONNECTED_MESSAGE};
pub use macropad_config::{ConfigAction, ConfigPatch, ConfigUpdate, DeviceConfig, SlotKey};
pub use macropad_frame::FrameMode;
pub use macropad_transport::UsbTarget;

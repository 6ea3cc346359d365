//! Prelude module for common imports
//!
//! ```
//! use macropad_protocol::prelude::*;
//! ```

pub use crate::action::WireAction;
pub use crate::command::{Command, CommandKind};
pub use crate::config::{DeviceConfig, DeviceSettings, WidgetItem, WidgetKind, WifiSettings};
pub use crate::error::{ProtocolError, ProtocolResult};
pub use crate::header::{CorrelationCounter, PROTOCOL_VERSION, ProtocolHeader, ProtocolVersion};
pub use crate::response::{
    AckResponse, ConfigResponse, ErrorResponse, Response, ResponseKind, parse_response,
};

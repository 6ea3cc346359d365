//! Normalized actions
//!
//! [`ConfigAction`] serializes uniformly as `{"type": "<Variant>", ...}`,
//! including parameterless variants. Conversions to and from
//! [`WireAction`] restore the firmware's bare-string / single-key-object
//! split.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use macropad_protocol::WireAction;

use crate::error::{ConfigError, ConfigResult};

/// One step of a button's action list, in host form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConfigAction {
    /// Press one or more keys, optionally with a modifier
    KeyPress {
        /// Key names
        keys: Vec<String>,
        /// Modifier name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modifier: Option<String>,
    },
    /// Release all pressed keys
    KeyRelease,
    /// Press a mouse button
    MousePress {
        /// Button bitmask
        button: u8,
    },
    /// Release mouse buttons
    MouseRelease,
    /// Relative pointer movement
    MouseMove {
        /// Horizontal delta
        dx: i8,
        /// Vertical delta
        dy: i8,
    },
    /// Scroll wheel movement
    MouseWheel {
        /// Scroll amount
        amount: i8,
    },
    /// Press a consumer-control usage
    ConsumerPress {
        /// HID consumer usage id
        usage_id: u16,
    },
    /// Release consumer controls
    ConsumerRelease,
    /// Pause before the next action
    Delay {
        /// Milliseconds to wait
        ms: u64,
    },
    /// Type a sequence of keys
    SendString {
        /// Key names typed in order
        keys: Vec<String>,
        /// Modifiers held while typing
        #[serde(default)]
        modifiers: Vec<String>,
    },
    /// Nested macro
    Sequence {
        /// Steps of the macro
        actions: Vec<ConfigAction>,
    },
}

impl ConfigAction {
    /// Normalize a raw JSON action in any accepted shape
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        WireAction::from_wire_value(value)
            .map(ConfigAction::from)
            .map_err(|e| ConfigError::InvalidAction(e.to_string()))
    }

    /// Convert back to firmware wire form
    pub fn to_wire(&self) -> WireAction {
        WireAction::from(self.clone())
    }

    /// Variant name
    pub fn name(&self) -> &'static str {
        self.to_wire().tag()
    }
}

impl From<WireAction> for ConfigAction {
    fn from(action: WireAction) -> Self {
        match action {
            WireAction::KeyPress { keys, modifier } => ConfigAction::KeyPress { keys, modifier },
            WireAction::KeyRelease => ConfigAction::KeyRelease,
            WireAction::MousePress { button } => ConfigAction::MousePress { button },
            WireAction::MouseRelease => ConfigAction::MouseRelease,
            WireAction::MouseMove { dx, dy } => ConfigAction::MouseMove { dx, dy },
            WireAction::MouseWheel { amount } => ConfigAction::MouseWheel { amount },
            WireAction::ConsumerPress { usage_id } => ConfigAction::ConsumerPress { usage_id },
            WireAction::ConsumerRelease => ConfigAction::ConsumerRelease,
            WireAction::Delay { ms } => ConfigAction::Delay { ms },
            WireAction::SendString { keys, modifiers } => {
                ConfigAction::SendString { keys, modifiers }
            }
            WireAction::Sequence(actions) => ConfigAction::Sequence {
                actions: actions.into_iter().map(ConfigAction::from).collect(),
            },
        }
    }
}

impl From<ConfigAction> for WireAction {
    fn from(action: ConfigAction) -> Self {
        match action {
            ConfigAction::KeyPress { keys, modifier } => WireAction::KeyPress { keys, modifier },
            ConfigAction::KeyRelease => WireAction::KeyRelease,
            ConfigAction::MousePress { button } => WireAction::MousePress { button },
            ConfigAction::MouseRelease => WireAction::MouseRelease,
            ConfigAction::MouseMove { dx, dy } => WireAction::MouseMove { dx, dy },
            ConfigAction::MouseWheel { amount } => WireAction::MouseWheel { amount },
            ConfigAction::ConsumerPress { usage_id } => WireAction::ConsumerPress { usage_id },
            ConfigAction::ConsumerRelease => WireAction::ConsumerRelease,
            ConfigAction::Delay { ms } => WireAction::Delay { ms },
            ConfigAction::SendString { keys, modifiers } => {
                WireAction::SendString { keys, modifiers }
            }
            ConfigAction::Sequence { actions } => {
                WireAction::Sequence(actions.into_iter().map(WireAction::from).collect())
            }
        }
    }
}

/// Normalize a wire action list
pub fn normalize_all(actions: Vec<WireAction>) -> Vec<ConfigAction> {
    actions.into_iter().map(ConfigAction::from).collect()
}

/// De-normalize a host action list
pub fn denormalize_all(actions: &[ConfigAction]) -> Vec<WireAction> {
    actions.iter().map(ConfigAction::to_wire).collect()
}

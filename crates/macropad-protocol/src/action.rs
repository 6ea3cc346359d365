//! Firmware action encoding
//!
//! Parameterless actions travel as a bare string tag (`"KeyRelease"`),
//! parameterized ones as a single-key object (`{"KeyPress":{...}}`). That is
//! serde's externally tagged representation, so the derive produces it
//! directly. Incoming values pass through [`crate::compat`] first.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compat::canonicalize_action;
use crate::error::{ProtocolError, ProtocolResult};

/// One step of a button's action list, in firmware wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireAction {
    /// Press one or more keys, optionally with a modifier
    KeyPress {
        /// Key names, e.g. `KeyA`
        keys: Vec<String>,
        /// Modifier name, e.g. `ControlLeft`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modifier: Option<String>,
    },
    /// Release all pressed keys
    KeyRelease,
    /// Press a mouse button (bitmask: 1 left, 2 right, 4 middle)
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
    /// Press a consumer-control usage (media keys)
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
    /// Type a sequence of keys with held modifiers
    SendString {
        /// Key names typed in order
        keys: Vec<String>,
        /// Modifiers held while typing
        #[serde(default)]
        modifiers: Vec<String>,
    },
    /// Nested macro
    Sequence(Vec<WireAction>),
}

impl WireAction {
    /// Parse a wire value, accepting legacy shapes
    pub fn from_wire_value(value: Value) -> ProtocolResult<Self> {
        let canonical = canonicalize_action(value)?;
        serde_json::from_value(canonical.clone())
            .map_err(|e| ProtocolError::UnrecognizedAction(format!("{canonical}: {e}")))
    }

    /// Variant name as it appears on the wire
    pub fn tag(&self) -> &'static str {
        match self {
            WireAction::KeyPress { .. } => "KeyPress",
            WireAction::KeyRelease => "KeyRelease",
            WireAction::MousePress { .. } => "MousePress",
            WireAction::MouseRelease => "MouseRelease",
            WireAction::MouseMove { .. } => "MouseMove",
            WireAction::MouseWheel { .. } => "MouseWheel",
            WireAction::ConsumerPress { .. } => "ConsumerPress",
            WireAction::ConsumerRelease => "ConsumerRelease",
            WireAction::Delay { .. } => "Delay",
            WireAction::SendString { .. } => "SendString",
            WireAction::Sequence(_) => "Sequence",
        }
    }

    /// True for variants encoded as a bare string
    pub fn is_unit(&self) -> bool {
        matches!(
            self,
            WireAction::KeyRelease | WireAction::MouseRelease | WireAction::ConsumerRelease
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_unit_variant_is_bare_string() -> TestResult {
        assert_eq!(serde_json::to_value(WireAction::KeyRelease)?, json!("KeyRelease"));
        assert_eq!(
            serde_json::to_value(WireAction::ConsumerRelease)?,
            json!("ConsumerRelease")
        );
        Ok(())
    }

    #[test]
    fn test_struct_variant_is_single_key_object() -> TestResult {
        let action = WireAction::KeyPress {
            keys: vec!["KeyA".to_string()],
            modifier: Some("ShiftLeft".to_string()),
        };
        assert_eq!(
            serde_json::to_value(action)?,
            json!({"KeyPress": {"keys": ["KeyA"], "modifier": "ShiftLeft"}})
        );
        assert_eq!(
            serde_json::to_value(WireAction::ConsumerPress { usage_id: 0xE9 })?,
            json!({"ConsumerPress": {"usage_id": 233}})
        );
        Ok(())
    }

    #[test]
    fn test_sequence_is_newtype_array() -> TestResult {
        let action = WireAction::Sequence(vec![
            WireAction::Delay { ms: 100 },
            WireAction::KeyRelease,
        ]);
        assert_eq!(
            serde_json::to_value(action)?,
            json!({"Sequence": [{"Delay": {"ms": 100}}, "KeyRelease"]})
        );
        Ok(())
    }

    #[test]
    fn test_from_wire_value_rejects_unknown_tag() {
        let result = WireAction::from_wire_value(json!("Explode"));
        assert!(matches!(result, Err(ProtocolError::UnrecognizedAction(_))));
    }

    #[test]
    fn test_tag_and_unit() {
        assert_eq!(WireAction::MouseWheel { amount: -1 }.tag(), "MouseWheel");
        assert!(WireAction::MouseRelease.is_unit());
        assert!(!WireAction::Delay { ms: 1 }.is_unit());
    }
}

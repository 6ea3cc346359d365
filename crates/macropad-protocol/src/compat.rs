//! Rewrites legacy wire shapes into canonical form
//!
//! Firmware builds and saved configuration files in the field carry several
//! encodings of the same action. Everything is funnelled through
//! [`canonicalize_action`] before typed deserialization, so no other code has
//! to inspect raw JSON shapes.
//!
//! Accepted action shapes:
//!
//! | Input                                  | Canonical output                      |
//! |----------------------------------------|---------------------------------------|
//! | `"KeyRelease"`                         | `"KeyRelease"`                        |
//! | `{"KeyRelease": null}` / `{...: {}}`   | `"KeyRelease"`                        |
//! | `{"KeyPress": {"keys": [..]}}`         | unchanged                             |
//! | `{"KeyPress": {"key": "KeyA"}}`        | `{"KeyPress": {"keys": ["KeyA"]}}`    |
//! | `{"ConsumerPress": {"usageId": 1}}`    | `{"ConsumerPress": {"usage_id": 1}}`  |
//! | `{"type": "Delay", "ms": 5}`           | `{"Delay": {"ms": 5}}`                |
//! | `{"Sequence": {"actions": [..]}}`      | `{"Sequence": [..]}`                  |

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::action::WireAction;
use crate::error::{ProtocolError, ProtocolResult};

/// Actions that carry no parameters
pub const UNIT_ACTIONS: [&str; 3] = ["KeyRelease", "MouseRelease", "ConsumerRelease"];

/// Response tags recognized on the wire
pub const RESPONSE_TAGS: [&str; 3] = ["Config", "Ack", "Error"];

/// Rewrite any accepted action shape into serde's externally tagged form.
///
/// Pure: no I/O, no logging side effects beyond tracing. Nested sequences are
/// rewritten recursively.
pub fn canonicalize_action(value: Value) -> ProtocolResult<Value> {
    match value {
        Value::String(tag) => Ok(Value::String(tag)),
        Value::Object(mut map) => {
            if let Some(tag) = map.remove("type") {
                let Value::String(tag) = tag else {
                    return Err(unrecognized(&Value::Object(map)));
                };
                trace!(tag = %tag, "rewriting type-tagged action");
                return canonicalize_tagged(tag, Value::Object(map));
            }

            if map.len() != 1 {
                return Err(unrecognized(&Value::Object(map)));
            }
            match map.into_iter().next() {
                Some((tag, body)) => canonicalize_tagged(tag, body),
                None => Err(ProtocolError::UnrecognizedAction("{}".to_string())),
            }
        }
        other => Err(unrecognized(&other)),
    }
}

fn canonicalize_tagged(tag: String, body: Value) -> ProtocolResult<Value> {
    if UNIT_ACTIONS.contains(&tag.as_str()) {
        return match body {
            Value::Null => Ok(Value::String(tag)),
            Value::Object(ref fields) if fields.is_empty() => Ok(Value::String(tag)),
            other => Err(unrecognized(&other)),
        };
    }

    let body = match (tag.as_str(), body) {
        ("Sequence", Value::Array(items)) => canonicalize_sequence(items)?,
        ("Sequence", Value::Object(mut fields)) => match fields.remove("actions") {
            Some(Value::Array(items)) => canonicalize_sequence(items)?,
            _ => return Err(unrecognized(&Value::Object(fields))),
        },
        (_, Value::Object(fields)) => Value::Object(rename_legacy_fields(&tag, fields)),
        (_, other) => other,
    };

    let mut wrapped = Map::with_capacity(1);
    wrapped.insert(tag, body);
    Ok(Value::Object(wrapped))
}

fn canonicalize_sequence(items: Vec<Value>) -> ProtocolResult<Value> {
    items
        .into_iter()
        .map(canonicalize_action)
        .collect::<ProtocolResult<Vec<Value>>>()
        .map(Value::Array)
}

fn rename_legacy_fields(tag: &str, mut fields: Map<String, Value>) -> Map<String, Value> {
    match tag {
        "KeyPress" if !fields.contains_key("keys") => {
            if let Some(key) = fields.remove("key") {
                fields.insert("keys".to_string(), Value::Array(vec![key]));
            }
        }
        "ConsumerPress" if !fields.contains_key("usage_id") => {
            if let Some(usage) = fields.remove("usageId") {
                fields.insert("usage_id".to_string(), usage);
            }
        }
        _ => {}
    }
    fields
}

fn unrecognized(value: &Value) -> ProtocolError {
    ProtocolError::UnrecognizedAction(value.to_string())
}

/// Rewrite a response into its externally tagged form.
///
/// Besides the canonical `{"Config": {...}}` wrapper, some firmware builds
/// reply with the bare body. A body with `config` is a Config response, one
/// with `errorCode` an Error, one with `success` an Ack.
pub fn canonicalize_response(value: Value) -> ProtocolResult<Value> {
    let Value::Object(map) = value else {
        return Err(ProtocolError::InvalidStructure(format!(
            "expected a JSON object, got {}",
            json_type_name(&value)
        )));
    };

    let tags: Vec<&str> = RESPONSE_TAGS
        .iter()
        .copied()
        .filter(|tag| map.contains_key(*tag))
        .collect();

    match tags.as_slice() {
        [_] if map.len() == 1 => Ok(Value::Object(map)),
        [] if map.contains_key("header") => {
            let tag = if map.contains_key("config") {
                "Config"
            } else if map.contains_key("errorCode") {
                "Error"
            } else if map.contains_key("success") {
                "Ack"
            } else {
                return Err(ProtocolError::InvalidStructure(format!(
                    "unrecognized response body with keys [{}]",
                    key_list(&map)
                )));
            };
            trace!(tag, "wrapping bare response body");
            let mut wrapped = Map::with_capacity(1);
            wrapped.insert(tag.to_string(), Value::Object(map));
            Ok(Value::Object(wrapped))
        }
        _ => Err(ProtocolError::InvalidStructure(format!(
            "expected exactly one of Config, Ack or Error, got keys [{}]",
            key_list(&map)
        ))),
    }
}

fn key_list(map: &Map<String, Value>) -> String {
    map.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserialize a mappings table, sending every action through the shim
pub(crate) fn deserialize_mappings<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<WireAction>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Vec<Value>>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, actions)| {
            let parsed = actions
                .into_iter()
                .map(WireAction::from_wire_value)
                .collect::<ProtocolResult<Vec<_>>>()
                .map_err(|e| D::Error::custom(format!("mapping {key}: {e}")))?;
            Ok((key, parsed))
        })
        .collect()
}

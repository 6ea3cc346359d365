//! Mapping key translation
//!
//! Wire mapping keys are one-based decimal strings. The model uses zero-based
//! slots. Reading subtracts one from every canonical positive integer key,
//! writing adds it back. `"0"` is already zero-based and passes through, as
//! does the `"default"` entry, which is not a button slot at all. Anything
//! else is kept verbatim.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Key of the fallback mapping
pub const DEFAULT_KEY: &str = "default";

/// Model-side mapping key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    /// Zero-based button slot
    Slot(u32),
    /// The `"default"` mapping
    Default,
    /// Key that is neither a slot nor `"default"`, kept verbatim
    Named(String),
}

impl SlotKey {
    /// Translate a wire key (one-based) into a model key
    pub fn from_wire(key: &str) -> Self {
        if key == DEFAULT_KEY {
            return SlotKey::Default;
        }
        match parse_canonical(key) {
            Some(0) => SlotKey::Slot(0),
            Some(n) => n
                .checked_sub(1)
                .and_then(|slot| u32::try_from(slot).ok())
                .map_or_else(|| SlotKey::Named(key.to_string()), SlotKey::Slot),
            None => SlotKey::Named(key.to_string()),
        }
    }

    /// Translate back into a wire key (one-based)
    pub fn to_wire(&self) -> String {
        match self {
            SlotKey::Slot(slot) => u64::from(*slot).saturating_add(1).to_string(),
            SlotKey::Default => DEFAULT_KEY.to_string(),
            SlotKey::Named(name) => name.clone(),
        }
    }

    /// Parse a model key as rendered by [`std::fmt::Display`]
    pub fn from_model(key: &str) -> Self {
        if key == DEFAULT_KEY {
            return SlotKey::Default;
        }
        match parse_canonical(key).and_then(|n| u32::try_from(n).ok()) {
            Some(slot) => SlotKey::Slot(slot),
            None => SlotKey::Named(key.to_string()),
        }
    }

    /// Zero-based slot index, if this is a button slot
    pub fn slot(&self) -> Option<u32> {
        match self {
            SlotKey::Slot(slot) => Some(*slot),
            _ => None,
        }
    }

    /// True for button slots, false for `"default"` and named keys
    pub fn is_slot(&self) -> bool {
        matches!(self, SlotKey::Slot(_))
    }
}

impl From<u32> for SlotKey {
    fn from(slot: u32) -> Self {
        SlotKey::Slot(slot)
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotKey::Slot(slot) => write!(f, "{slot}"),
            SlotKey::Default => f.write_str(DEFAULT_KEY),
            SlotKey::Named(name) => f.write_str(name),
        }
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(SlotKey::from_model(&key))
    }
}

/// Translate a wire key string into a model key string
pub fn wire_to_model_key(key: &str) -> String {
    SlotKey::from_wire(key).to_string()
}

/// Translate a model key string into a wire key string
pub fn model_to_wire_key(key: &str) -> String {
    SlotKey::from_model(key).to_wire()
}

/// Decimal digits with no sign and no leading zero (other than `"0"` itself)
fn parse_canonical(key: &str) -> Option<u64> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if canonical { key.parse().ok() } else { None }
}

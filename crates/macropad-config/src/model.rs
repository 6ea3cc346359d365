//! Host-side device configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use macropad_protocol::{self as protocol, DeviceSettings, WidgetItem};

use crate::action::{ConfigAction, denormalize_all, normalize_all};
use crate::slot::SlotKey;

/// Device configuration with zero-based slots and normalized actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Global settings
    pub settings: DeviceSettings,
    /// Action lists keyed by slot, `default` or a verbatim key
    pub mappings: BTreeMap<SlotKey, Vec<ConfigAction>>,
    /// Display names keyed by zero-based slot
    pub button_names: BTreeMap<u32, String>,
    /// Widgets keyed by id
    pub widgets: BTreeMap<u32, WidgetItem>,
}

/// A button slot joined with its display name, for UI listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonSlot {
    /// Zero-based slot index
    pub index: u32,
    /// Display name, if one is set
    pub name: Option<String>,
    /// Assigned actions
    pub actions: Vec<ConfigAction>,
}

impl DeviceConfig {
    /// Translate a configuration received from the device.
    ///
    /// When two wire keys land on the same slot (`"0"` and `"1"` both mean
    /// slot 0) the translated one-based key wins.
    pub fn from_wire(wire: protocol::DeviceConfig) -> Self {
        let mut mappings: BTreeMap<SlotKey, Vec<ConfigAction>> = BTreeMap::new();
        let mut passthrough_zero = None;

        for (wire_key, actions) in wire.mappings {
            let key = SlotKey::from_wire(&wire_key);
            let actions = normalize_all(actions);
            if wire_key == "0" {
                passthrough_zero = Some(actions);
                continue;
            }
            mappings.insert(key, actions);
        }

        if let Some(actions) = passthrough_zero {
            if mappings.contains_key(&SlotKey::Slot(0)) {
                warn!("mapping keys \"0\" and \"1\" both name slot 0, keeping \"1\"");
            } else {
                mappings.insert(SlotKey::Slot(0), actions);
            }
        }

        let widgets = wire
            .widgets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(id, item)| item.map(|item| (id, item)))
            .collect();

        Self {
            settings: wire.settings,
            mappings,
            button_names: wire.button_names.unwrap_or_default(),
            widgets,
        }
    }

    /// Translate into a full wire configuration
    pub fn to_wire(&self) -> protocol::DeviceConfig {
        protocol::DeviceConfig {
            settings: self.settings.clone(),
            mappings: self
                .mappings
                .iter()
                .map(|(key, actions)| (key.to_wire(), denormalize_all(actions)))
                .collect(),
            button_names: Some(self.button_names.clone()),
            widgets: Some(
                self.widgets
                    .iter()
                    .map(|(id, item)| (*id, Some(item.clone())))
                    .collect(),
            ),
        }
    }

    /// Translate into a wire configuration that replaces `previous` on the
    /// device. The firmware merges widgets by id, so widgets present in
    /// `previous` but missing here are sent as deletions.
    pub fn to_wire_replacing(&self, previous: &DeviceConfig) -> protocol::DeviceConfig {
        let mut wire = self.to_wire();
        if let Some(widgets) = wire.widgets.as_mut() {
            for id in previous.widgets.keys() {
                if !self.widgets.contains_key(id) {
                    widgets.insert(*id, None);
                }
            }
        }
        wire
    }

    /// Actions for a button slot
    pub fn mapping(&self, slot: u32) -> Option<&[ConfigAction]> {
        self.mappings.get(&SlotKey::Slot(slot)).map(Vec::as_slice)
    }

    /// Actions for the `default` entry
    pub fn default_mapping(&self) -> Option<&[ConfigAction]> {
        self.mappings.get(&SlotKey::Default).map(Vec::as_slice)
    }

    /// Display name for a slot
    pub fn button_name(&self, slot: u32) -> Option<&str> {
        self.button_names.get(&slot).map(String::as_str)
    }

    /// Every button slot with a mapping or a name, in slot order.
    ///
    /// `default` and verbatim keys are not slots and are left out.
    pub fn button_slots(&self) -> Vec<ButtonSlot> {
        let mut indices: Vec<u32> = self
            .mappings
            .keys()
            .filter_map(SlotKey::slot)
            .chain(self.button_names.keys().copied())
            .collect();
        indices.sort_unstable();
        indices.dedup();

        indices
            .into_iter()
            .map(|index| ButtonSlot {
                index,
                name: self.button_names.get(&index).cloned(),
                actions: self.mapping(index).map(<[_]>::to_vec).unwrap_or_default(),
            })
            .collect()
    }
}

impl From<protocol::DeviceConfig> for DeviceConfig {
    fn from(wire: protocol::DeviceConfig) -> Self {
        DeviceConfig::from_wire(wire)
    }
}

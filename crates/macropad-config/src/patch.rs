//! Partial configuration updates
//!
//! The firmware merges SetConfig payloads into its stored configuration:
//! absent settings stay as they are, listed mappings and names replace their
//! slot, and widget ids map to an item or to `null` for deletion.

use std::collections::BTreeMap;

use macropad_protocol::{self as protocol, DeviceSettings, WifiSettings};

use crate::action::{ConfigAction, denormalize_all};
use crate::model::DeviceConfig;
use crate::slot::SlotKey;
use crate::widgets::WidgetChanges;

/// Builder for a partial SetConfig payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    settings: DeviceSettings,
    mappings: BTreeMap<SlotKey, Vec<ConfigAction>>,
    button_names: BTreeMap<u32, String>,
    widgets: WidgetChanges,
}

impl ConfigPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Wi-Fi credentials
    pub fn wifi(mut self, ssid: impl Into<String>, password: impl Into<String>) -> Self {
        self.settings.wifi = Some(WifiSettings {
            ssid: ssid.into(),
            password: password.into(),
        });
        self
    }

    /// Set the timezone offset in hours
    pub fn timezone_offset(mut self, hours: f32) -> Self {
        self.settings.timezone_offset = Some(hours);
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.settings.api_key = Some(key.into());
        self
    }

    /// Replace the actions of one mapping key
    pub fn mapping(mut self, key: impl Into<SlotKey>, actions: Vec<ConfigAction>) -> Self {
        self.mappings.insert(key.into(), actions);
        self
    }

    /// Rename one button slot
    pub fn button_name(mut self, slot: u32, name: impl Into<String>) -> Self {
        self.button_names.insert(slot, name.into());
        self
    }

    /// Include staged widget edits
    pub fn widgets(mut self, changes: WidgetChanges) -> Self {
        self.widgets.extend(changes);
        self
    }

    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
            && self.mappings.is_empty()
            && self.button_names.is_empty()
            && self.widgets.is_empty()
    }

    /// Render as a wire configuration, translating slot keys and actions
    pub fn to_wire(&self) -> protocol::DeviceConfig {
        protocol::DeviceConfig {
            settings: self.settings.clone(),
            mappings: self
                .mappings
                .iter()
                .map(|(key, actions)| (key.to_wire(), denormalize_all(actions)))
                .collect(),
            button_names: (!self.button_names.is_empty()).then(|| self.button_names.clone()),
            widgets: (!self.widgets.is_empty()).then(|| self.widgets.clone()),
        }
    }
}

/// Either a whole configuration or a partial patch, as accepted by SetConfig
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    /// Replace settings, names and widgets with this configuration. Mapping
    /// slots left out keep their stored actions; the firmware only merges
    /// mappings.
    Full(DeviceConfig),
    /// Merge only the listed fields
    Partial(ConfigPatch),
}

impl ConfigUpdate {
    /// Render as a wire configuration
    pub fn to_wire(&self) -> protocol::DeviceConfig {
        match self {
            ConfigUpdate::Full(config) => config.to_wire(),
            ConfigUpdate::Partial(patch) => patch.to_wire(),
        }
    }

    /// Render against the configuration the device currently holds. A full
    /// update then also deletes the widgets it drops from `baseline`.
    pub fn to_wire_from(&self, baseline: Option<&DeviceConfig>) -> protocol::DeviceConfig {
        match (self, baseline) {
            (ConfigUpdate::Full(config), Some(baseline)) => config.to_wire_replacing(baseline),
            _ => self.to_wire(),
        }
    }
}

impl From<DeviceConfig> for ConfigUpdate {
    fn from(config: DeviceConfig) -> Self {
        ConfigUpdate::Full(config)
    }
}

impl From<ConfigPatch> for ConfigUpdate {
    fn from(patch: ConfigPatch) -> Self {
        ConfigUpdate::Partial(patch)
    }
}

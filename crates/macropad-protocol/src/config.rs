//! Device configuration as it appears on the wire
//!
//! Keys are kept exactly as the firmware sends them: mapping keys are
//! one-based strings (plus `"default"`), button names and widgets are keyed
//! by zero-based integers serialized as JSON strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::WireAction;
use crate::compat::deserialize_mappings;

/// Wi-Fi credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiSettings {
    /// Network name
    pub ssid: String,
    /// Network password
    pub password: String,
}

/// Global device settings. `None` fields are left unchanged on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Wi-Fi credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi: Option<WifiSettings>,
    /// Offset from UTC in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone_offset: Option<f32>,
    /// API key for widget data sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl DeviceSettings {
    /// True when no setting is present
    pub fn is_empty(&self) -> bool {
        self.wifi.is_none() && self.timezone_offset.is_none() && self.api_key.is_none()
    }
}

/// Full or partial device configuration in wire form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Global settings
    #[serde(default)]
    pub settings: DeviceSettings,
    /// One-based slot key (or `"default"`) to action list
    #[serde(default, deserialize_with = "deserialize_mappings")]
    pub mappings: BTreeMap<String, Vec<WireAction>>,
    /// Zero-based slot index to display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_names: Option<BTreeMap<u32, String>>,
    /// Widget id to item; a `null` value deletes that id on write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<BTreeMap<u32, Option<WidgetItem>>>,
}

/// A widget shown on the device display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetItem {
    /// Heading shown above the widget
    pub title: String,
    /// Content source
    pub kind: WidgetKind,
    /// Refresh period
    pub update_interval_seconds: u64,
}

/// Widget content source
///
/// On the wire a text widget is `{"Text": [url, pointer|null]}` and an image
/// widget is `{"Image": url}`. Older firmware wrote `{"Text": url}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WidgetKindRepr", into = "WidgetKindRepr")]
pub enum WidgetKind {
    /// Text fetched from a URL, optionally extracted with a JSON pointer
    Text {
        /// Source URL
        url: String,
        /// JSON pointer into the fetched document
        json_pointer: Option<String>,
    },
    /// Image fetched from a URL
    Image {
        /// Source URL
        url: String,
    },
}

impl WidgetKind {
    /// Source URL of either kind
    pub fn url(&self) -> &str {
        match self {
            WidgetKind::Text { url, .. } | WidgetKind::Image { url } => url,
        }
    }
}

#[derive(Serialize, Deserialize)]
enum WidgetKindRepr {
    Text(TextSource),
    Image(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TextSource {
    WithPointer(String, Option<String>),
    UrlOnly(String),
}

impl From<WidgetKindRepr> for WidgetKind {
    fn from(repr: WidgetKindRepr) -> Self {
        match repr {
            WidgetKindRepr::Text(TextSource::WithPointer(url, json_pointer)) => {
                WidgetKind::Text { url, json_pointer }
            }
            WidgetKindRepr::Text(TextSource::UrlOnly(url)) => WidgetKind::Text {
                url,
                json_pointer: None,
            },
            WidgetKindRepr::Image(url) => WidgetKind::Image { url },
        }
    }
}

impl From<WidgetKind> for WidgetKindRepr {
    fn from(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Text { url, json_pointer } => {
                WidgetKindRepr::Text(TextSource::WithPointer(url, json_pointer))
            }
            WidgetKind::Image { url } => WidgetKindRepr::Image(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_empty_settings_serialize_to_empty_object() -> TestResult {
        assert_eq!(serde_json::to_value(DeviceSettings::default())?, json!({}));
        Ok(())
    }

    #[test]
    fn test_text_widget_wire_form() -> TestResult {
        let item = WidgetItem {
            title: "Temp".to_string(),
            kind: WidgetKind::Text {
                url: "http://x/api".to_string(),
                json_pointer: None,
            },
            update_interval_seconds: 60,
        };
        assert_eq!(
            serde_json::to_value(&item)?,
            json!({"title": "Temp", "kind": {"Text": ["http://x/api", null]}, "update_interval_seconds": 60})
        );
        Ok(())
    }

    #[test]
    fn test_legacy_text_widget_accepted() -> TestResult {
        let kind: WidgetKind = serde_json::from_value(json!({"Text": "http://x"}))?;
        assert_eq!(
            kind,
            WidgetKind::Text {
                url: "http://x".to_string(),
                json_pointer: None
            }
        );
        Ok(())
    }

    #[test]
    fn test_image_widget_wire_form() -> TestResult {
        let kind = WidgetKind::Image {
            url: "http://x/i.png".to_string(),
        };
        assert_eq!(serde_json::to_value(&kind)?, json!({"Image": "http://x/i.png"}));
        assert_eq!(kind.url(), "http://x/i.png");
        Ok(())
    }

    #[test]
    fn test_config_keys_parse_from_strings() -> TestResult {
        let config: DeviceConfig = serde_json::from_value(json!({
            "settings": {},
            "mappings": {"1": ["KeyRelease"], "default": [{"Delay": {"ms": 5}}]},
            "button_names": {"0": "Vol+"},
            "widgets": {"3": null}
        }))?;

        assert_eq!(config.mappings.get("1"), Some(&vec![WireAction::KeyRelease]));
        assert_eq!(
            config.mappings.get("default"),
            Some(&vec![WireAction::Delay { ms: 5 }])
        );
        assert_eq!(
            config.button_names.as_ref().and_then(|n| n.get(&0)).map(String::as_str),
            Some("Vol+")
        );
        assert_eq!(config.widgets.as_ref().and_then(|w| w.get(&3)), Some(&None));
        Ok(())
    }

    #[test]
    fn test_missing_sections_default() -> TestResult {
        let config: DeviceConfig = serde_json::from_value(json!({}))?;
        assert!(config.settings.is_empty());
        assert!(config.mappings.is_empty());
        assert!(config.button_names.is_none());
        assert!(config.widgets.is_none());
        Ok(())
    }

    #[test]
    fn test_null_mappings_treated_as_empty() -> TestResult {
        let config: DeviceConfig = serde_json::from_value(json!({"mappings": null}))?;
        assert!(config.mappings.is_empty());
        Ok(())
    }

    #[test]
    fn test_bad_action_fails_config() {
        let result: Result<DeviceConfig, _> =
            serde_json::from_value(json!({"mappings": {"1": [42]}}));
        assert!(result.is_err());
    }
}

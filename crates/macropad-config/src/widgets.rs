//! Staged widget edits
//!
//! Widget changes are collected in a pending overlay and sent as one partial
//! SetConfig. The overlay is keyed by widget id; `Some(item)` adds or
//! replaces, `None` deletes. Later edits to the same id replace earlier ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use macropad_protocol::{WidgetItem, WidgetKind};

use crate::error::{ConfigError, ConfigResult};

/// Pending widget edits keyed by id; `None` marks a deletion
pub type WidgetChanges = BTreeMap<u32, Option<WidgetItem>>;

/// Last fetched widgets plus an overlay of unsaved edits
#[derive(Debug, Clone, Default)]
pub struct WidgetStaging {
    current: BTreeMap<u32, WidgetItem>,
    pending: WidgetChanges,
}

impl WidgetStaging {
    /// Start from the widgets of a fetched configuration
    pub fn new(current: BTreeMap<u32, WidgetItem>) -> Self {
        Self {
            current,
            pending: WidgetChanges::new(),
        }
    }

    /// Replace the baseline after a fetch. Pending edits are dropped.
    pub fn replace_current(&mut self, current: BTreeMap<u32, WidgetItem>) {
        self.current = current;
        self.pending.clear();
    }

    /// Widgets as last fetched
    pub fn current(&self) -> &BTreeMap<u32, WidgetItem> {
        &self.current
    }

    /// Unsaved edits
    pub fn pending(&self) -> &WidgetChanges {
        &self.pending
    }

    /// Whether any edit is staged
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Record an edit for `id`, replacing any earlier edit of the same id
    pub fn stage(&mut self, id: u32, item: Option<WidgetItem>) {
        self.pending.insert(id, item);
    }

    /// Current widgets with pending edits applied
    pub fn display(&self) -> BTreeMap<u32, WidgetItem> {
        let mut combined = self.current.clone();
        for (id, change) in &self.pending {
            match change {
                Some(item) => {
                    combined.insert(*id, item.clone());
                }
                None => {
                    combined.remove(id);
                }
            }
        }
        combined
    }

    /// Display view as an id-ordered list
    pub fn list(&self) -> Vec<(u32, WidgetItem)> {
        self.display().into_iter().collect()
    }

    /// One past the highest id in the display view, or 0 when empty
    pub fn next_id(&self) -> ConfigResult<u32> {
        match self.display().keys().next_back() {
            Some(max) => max.checked_add(1).ok_or(ConfigError::WidgetIdsExhausted),
            None => Ok(0),
        }
    }

    /// Validate a form and stage it under a fresh id
    pub fn add(&mut self, form: &WidgetForm) -> ConfigResult<u32> {
        let item = form.to_item()?;
        let id = self.next_id()?;
        debug!(id, title = %item.title, "staging widget add");
        self.stage(id, Some(item));
        Ok(id)
    }

    /// Validate a form and stage it over an existing id
    pub fn update(&mut self, id: u32, form: &WidgetForm) -> ConfigResult<()> {
        if !self.display().contains_key(&id) {
            return Err(ConfigError::WidgetNotFound(id));
        }
        let item = form.to_item()?;
        debug!(id, title = %item.title, "staging widget update");
        self.stage(id, Some(item));
        Ok(())
    }

    /// Stage deletion of an existing id, returning the removed widget
    pub fn delete(&mut self, id: u32) -> ConfigResult<WidgetItem> {
        let removed = self
            .display()
            .remove(&id)
            .ok_or(ConfigError::WidgetNotFound(id))?;
        debug!(id, title = %removed.title, "staging widget delete");
        self.stage(id, None);
        Ok(removed)
    }

    /// Pending edits to send, or `None` when nothing is staged
    pub fn pending_payload(&self) -> Option<WidgetChanges> {
        self.has_pending().then(|| self.pending.clone())
    }

    /// Drop all pending edits
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /// Clear pending edits after a successful save; the next fetch
    /// supplies the new baseline
    pub fn mark_saved(&mut self) {
        self.pending.clear();
    }
}

/// Widget content type selected in an edit form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetFormKind {
    /// Text widget
    #[default]
    Text,
    /// Image widget
    Image,
}

/// Editable representation of a widget
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetForm {
    /// Heading; surrounding whitespace is trimmed
    pub title: String,
    /// Content type
    pub kind: WidgetFormKind,
    /// Source URL
    pub url: String,
    /// JSON pointer, used only when `is_json` is set
    pub json_pointer: Option<String>,
    /// Whether the text source returns JSON
    pub is_json: bool,
    /// Refresh period
    pub update_interval_seconds: u64,
}

impl WidgetForm {
    /// Validate and convert into a wire widget
    pub fn to_item(&self) -> ConfigResult<WidgetItem> {
        let title = self.title.trim();
        if title.is_empty() || self.url.trim().is_empty() {
            return Err(ConfigError::InvalidWidget(
                "Title and URL are required".to_string(),
            ));
        }

        let kind = match self.kind {
            WidgetFormKind::Text => WidgetKind::Text {
                url: self.url.clone(),
                json_pointer: self
                    .json_pointer
                    .as_deref()
                    .map(str::trim)
                    .filter(|pointer| self.is_json && !pointer.is_empty())
                    .map(str::to_string),
            },
            WidgetFormKind::Image => WidgetKind::Image {
                url: self.url.clone(),
            },
        };

        Ok(WidgetItem {
            title: title.to_string(),
            kind,
            update_interval_seconds: self.update_interval_seconds,
        })
    }

    /// Build a form pre-filled from an existing widget
    pub fn from_item(item: &WidgetItem) -> Self {
        match &item.kind {
            WidgetKind::Text { url, json_pointer } => Self {
                title: item.title.clone(),
                kind: WidgetFormKind::Text,
                url: url.clone(),
                json_pointer: json_pointer.clone(),
                is_json: json_pointer.as_deref().is_some_and(|p| !p.is_empty()),
                update_interval_seconds: item.update_interval_seconds,
            },
            WidgetKind::Image { url } => Self {
                title: item.title.clone(),
                kind: WidgetFormKind::Image,
                url: url.clone(),
                json_pointer: None,
                is_json: false,
                update_interval_seconds: item.update_interval_seconds,
            },
        }
    }
}

impl From<&WidgetItem> for WidgetForm {
    fn from(item: &WidgetItem) -> Self {
        WidgetForm::from_item(item)
    }
}

//! Host-side configuration model for MacroPad devices
//!
//! The firmware numbers mapping slots from one and encodes actions in a
//! mixed bare-string / single-key-object form. This crate presents the same
//! data with zero-based slots and uniformly tagged actions, and translates
//! back on write.
//!
//! # Architecture
//!
//! - [`slot`]: mapping key translation (`"1"` on the wire is slot 0)
//! - [`action`]: normalized [`ConfigAction`] and conversions to and from wire form
//! - [`model`]: [`DeviceConfig`] and its wire conversions
//! - [`widgets`]: staged widget edits batched before a single save
//! - [`patch`]: partial SetConfig payloads
//! - [`error`]: model error types

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod action;
pub mod error;
pub mod model;
pub mod patch;
pub mod slot;
pub mod widgets;

pub use action::ConfigAction;
pub use error::{ConfigError, ConfigResult};
pub use model::{ButtonSlot, DeviceConfig};
pub use patch::{ConfigPatch, ConfigUpdate};
pub use slot::SlotKey;
pub use widgets::{WidgetChanges, WidgetForm, WidgetFormKind, WidgetStaging};

pub use macropad_protocol::{DeviceSettings, WidgetItem, WidgetKind, WifiSettings};

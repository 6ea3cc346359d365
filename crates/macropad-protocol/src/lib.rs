//! Command and response wire types for the MacroPad configuration protocol
//!
//! Every request carries a [`ProtocolHeader`] and is serialized as a JSON
//! object tagged by `"type"`. Responses come back externally tagged as one of
//! `Config`, `Ack` or `Error`.
//!
//! # Architecture
//!
//! - [`header`]: protocol version and correlation ids
//! - [`command`]: outgoing [`Command`] variants
//! - [`response`]: incoming [`Response`] variants and classification
//! - [`config`]: device configuration as it appears on the wire
//! - [`action`]: firmware action encoding
//! - [`compat`]: rewrites legacy action and response shapes into canonical form
//! - [`error`]: protocol error types
//!
//! Mapping slot keys are one-based on the wire and button-name keys are
//! zero-based. This crate keeps them exactly as the firmware sends them;
//! translation into the host model happens in `macropad-config`.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod action;
pub mod command;
pub mod compat;
pub mod config;
pub mod error;
pub mod header;
pub mod prelude;
pub mod response;

pub use action::WireAction;
pub use command::{Command, CommandKind};
pub use config::{DeviceConfig, DeviceSettings, WidgetItem, WidgetKind, WifiSettings};
pub use error::{ProtocolError, ProtocolResult};
pub use header::{CorrelationCounter, PROTOCOL_VERSION, ProtocolHeader, ProtocolVersion};
pub use response::{AckResponse, ConfigResponse, ErrorResponse, Response, ResponseKind, parse_response};

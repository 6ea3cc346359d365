//! Host client for MacroPad configuration over USB bulk transfers
//!
//! This crate ties the frame codec, protocol types and configuration model
//! to a transport and runs the device's strictly sequential command/response
//! protocol.
//!
//! # Architecture
//!
//! - [`session`]: [`DeviceSession`], the connect/get/set/reset/reboot surface
//! - [`engine`]: [`RequestEngine`], one round trip under a deadline
//! - [`connection`]: exclusive ownership of the opened transport
//! - [`api`]: the uniform `{ data, error }` result shape
//! - [`debug_log`]: bounded most-recent-first log of raw payloads
//! - [`config`]: [`ClientConfig`] timings, framing and USB target
//! - [`error`]: client error types
//!
//! # Concurrency
//!
//! One request is in flight per session at any time. A call made while
//! another is outstanding fails with [`ClientError::Busy`].
//!
//! # Example
//!
//! ```no_run
//! use macropad_client::prelude::*;
//!
//! async fn show_mappings() -> Result<(), ClientError> {
//!     let session = DeviceSession::usb(ClientConfig::default())?;
//!     session.try_connect().await?;
//!     let config = session.try_get_config().await?;
//!     for slot in config.button_slots() {
//!         println!("{}: {} actions", slot.index, slot.actions.len());
//!     }
//!     session.try_disconnect().await?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod config;
pub mod connection;
pub mod debug_log;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod session;

pub use api::ApiResult;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use connection::{Connection, ConnectionState, DeviceConnectionInfo};
pub use debug_log::{DebugEntry, DebugLog, LogDirection};
pub use engine::RequestEngine;
pub use error::{ClientError, ClientResult};
pub use session::DeviceSession;

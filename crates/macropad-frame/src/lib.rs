//! Stream framing for the MacroPad USB bulk channel
//!
//! USB bulk reads return arbitrarily sized chunks, so a single message may
//! arrive in many pieces and one read may carry the tail of a message. This
//! crate turns a byte stream back into whole JSON payloads.
//!
//! # Architecture
//!
//! - [`framed`]: length-prefixed frames (`magic:u32 BE | length:u32 BE | payload`)
//! - [`raw`]: bare JSON with no prefix, delimited by parsing
//! - [`codec`]: [`FrameCodec`] selects one of the two per connection
//! - [`error`]: framing error types
//!
//! # Example
//!
//! ```
//! use macropad_frame::{FrameCodec, FrameMode};
//!
//! let codec = FrameCodec::new(FrameMode::Framed);
//! let bytes = codec.encode(br#"{"type":"GetConfig"}"#)?;
//!
//! let mut decoder = codec.decoder();
//! let (head, tail) = bytes.split_at(5);
//! assert!(decoder.feed(head)?.is_none());
//! assert_eq!(decoder.feed(tail)?.as_deref(), Some(&br#"{"type":"GetConfig"}"#[..]));
//! # Ok::<(), macropad_frame::FrameError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod error;
pub mod framed;
pub mod raw;

pub use codec::{FrameCodec, FrameMode, StreamDecoder};
pub use error::{FrameError, FrameResult};
pub use framed::{FrameHeader, FramedDecoder};
pub use raw::RawJsonDecoder;

/// Magic word that opens every framed message.
pub const MAGIC_WORD: u32 = 0xE59D_ECC0;

/// Upper bound on buffered bytes before a decoder gives up (10 MiB).
pub const DEFAULT_MAX_BUFFER: usize = 10 * 1024 * 1024;

//! Protocol version and request correlation

use serde::{Deserialize, Serialize};

/// Protocol version understood by this host (1.0, `0x00010000` on the wire)
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::new(1, 0);

/// Packed protocol version: major in the high 16 bits, minor in the low 16
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolVersion(u32);

impl ProtocolVersion {
    /// Build a version from its major and minor parts
    pub const fn new(major: u16, minor: u16) -> Self {
        let [ma, mb] = major.to_be_bytes();
        let [na, nb] = minor.to_be_bytes();
        Self(u32::from_be_bytes([ma, mb, na, nb]))
    }

    /// Wrap a raw wire value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw wire value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Major version
    pub const fn major(self) -> u16 {
        let [a, b, _, _] = self.0.to_be_bytes();
        u16::from_be_bytes([a, b])
    }

    /// Minor version
    pub const fn minor(self) -> u16 {
        let [_, _, a, b] = self.0.to_be_bytes();
        u16::from_be_bytes([a, b])
    }

    /// Versions sharing a major number can talk to each other
    pub const fn is_compatible_with(self, other: ProtocolVersion) -> bool {
        self.major() == other.major()
    }

    /// Hex rendering used in connection info, e.g. `0x10000`
    pub fn to_hex(self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        PROTOCOL_VERSION
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Header attached to every command and response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolHeader {
    /// Sender's protocol version
    pub version: ProtocolVersion,
    /// Optional id echoed by the device so replies can be matched to requests
    #[serde(
        rename = "correlationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correlation_id: Option<u64>,
}

impl ProtocolHeader {
    /// Header for the current protocol version with a correlation id
    pub fn new(correlation_id: u64) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            correlation_id: Some(correlation_id),
        }
    }

    /// Header for the current protocol version with no correlation id
    pub fn uncorrelated() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            correlation_id: None,
        }
    }
}

impl Default for ProtocolHeader {
    fn default() -> Self {
        Self::uncorrelated()
    }
}

/// Monotonic source of correlation ids, starting at 1
#[derive(Debug, Clone)]
pub struct CorrelationCounter {
    next: u64,
}

impl CorrelationCounter {
    /// Create a counter whose first id is 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next id. Wraps back to 1, never yields 0.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = match self.next.checked_add(1) {
            Some(next) => next,
            None => 1,
        };
        id
    }

    /// Build a header carrying the next id
    pub fn next_header(&mut self) -> ProtocolHeader {
        ProtocolHeader::new(self.next_id())
    }
}

impl Default for CorrelationCounter {
    fn default() -> Self {
        Self::new()
    }
}

//! Time-ordered note identifiers
//!
//! A [`NoteId`] is a 12-byte value laid out as:
//!
//! - 4 bytes: big-endian seconds since the Unix epoch
//! - 5 bytes: per-process random value
//! - 3 bytes: big-endian counter, seeded randomly per process
//!
//! Byte-wise comparison therefore follows creation order, which is what makes
//! the identifier usable as the tie-break key of every listing sort.
//!
//! The wire form is the lowercase hex string (24 characters).
//!
//! ```rust
//! use notes_service::ids::NoteId;
//! use std::str::FromStr;
//!
//! let id = NoteId::new();
//! let parsed = NoteId::from_str(&id.to_hex()).unwrap();
//! assert_eq!(id, parsed);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use http::{HeaderValue, Request};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tower_http::request_id::{MakeRequestId, RequestId};

const COUNTER_MASK: u32 = 0x00FF_FFFF;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Globally unique, creation-ordered note identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId([u8; NoteId::LEN]);

impl NoteId {
    /// Length of the identifier in bytes
    pub const LEN: usize = 12;

    /// Generate a new identifier stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        let secs = Utc::now().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
            .fetch_add(1, Ordering::Relaxed);
        let unique = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);

        let mut bytes = [0u8; Self::LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(unique);
        bytes[9..].copy_from_slice(&(counter & COUNTER_MASK).to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Build a deterministic identifier from a timestamp and a counter.
    ///
    /// The random section is zeroed, so identifiers built this way order by
    /// `(secs, counter)`. Used for fixtures and imports.
    #[must_use]
    pub fn from_parts(secs: u32, counter: u32) -> Self {
        let mut bytes = [0u8; Self::LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[9..].copy_from_slice(&(counter & COUNTER_MASK).to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Lowercase hex form, as used on the wire.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for NoteId {
    type Err = NoteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s).map_err(NoteIdError::Hex)?;
        let bytes: [u8; Self::LEN] = decoded
            .try_into()
            .map_err(|raw: Vec<u8>| NoteIdError::Length(raw.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for NoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for identifier parsing.
#[derive(Debug, thiserror::Error)]
pub enum NoteIdError {
    /// The value is not valid hex.
    #[error("identifier is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The value decoded to the wrong number of bytes.
    #[error("identifier must be {expected} bytes, got {0}", expected = NoteId::LEN)]
    Length(usize),
}

/// Request id generator for [`SetRequestIdLayer`](tower_http::request_id::SetRequestIdLayer)
///
/// Ids share the [`NoteId`] layout so they sort by arrival time, and carry a
/// `req_` prefix: `req_65f1a2b3c4d5e6f708091a2b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeHexRequestId;

impl MakeHexRequestId {
    pub const PREFIX: &'static str = "req_";
}

impl MakeRequestId for MakeHexRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = format!("{}{}", Self::PREFIX, NoteId::new().to_hex());
        let header_value = HeaderValue::from_str(&id).ok()?;
        Some(RequestId::new(header_value))
    }
}

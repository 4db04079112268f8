//! Write payloads and the size ceiling that guards every write.
//!
//! The ceiling is measured on the serialized JSON of what the caller sent
//! (identification plus both bodies). Provenance comes from request
//! metadata, not from the body, and does not count toward the limit.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

/// Largest accepted write payload, in bytes of serialized input.
pub const MAX_PAYLOAD_BYTES: usize = 100_000;

/// An empty JSON object, the neutral value for any body.
pub fn empty_body() -> Value {
    Value::Object(Map::new())
}

/// Reject `size` if it exceeds [`MAX_PAYLOAD_BYTES`].
pub fn check_size(size: usize) -> Result<()> {
    if size > MAX_PAYLOAD_BYTES {
        return Err(CoreError::PayloadTooLarge {
            size,
            limit: MAX_PAYLOAD_BYTES,
        });
    }
    Ok(())
}

/// Serialize `value` and check the result against the ceiling.
///
/// Returns the measured size on success.
pub fn ensure_within_limit<T: Serialize>(value: &T) -> Result<usize> {
    let size = serde_json::to_vec(value)
        .map_err(|e| CoreError::MalformedPayload(e.to_string()))?
        .len();
    check_size(size)?;
    Ok(size)
}

/// Where a write came from. Visible only to authenticated readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub origin_url: String,
    pub user_agent: String,
}

impl Provenance {
    pub fn new(origin_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            origin_url: origin_url.into(),
            user_agent: user_agent.into(),
        }
    }
}

/// The public/private body pair carried by resources and entry revisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bodies {
    #[serde(default = "empty_body")]
    pub public_body: Value,
    #[serde(default = "empty_body")]
    pub private_body: Value,
}

impl Bodies {
    pub fn new(public_body: Value, private_body: Value) -> Self {
        Self {
            public_body,
            private_body,
        }
    }

    /// Both bodies empty, as written by a deletion record.
    pub fn empty() -> Self {
        Self::new(empty_body(), empty_body())
    }

    /// Check the serialized pair against the ceiling.
    pub fn check_size(&self) -> Result<usize> {
        ensure_within_limit(self)
    }
}

/// A submitted entry, as sent in the JSON body of an entry POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub identification: String,
    #[serde(default = "empty_body")]
    pub public_body: Value,
    #[serde(default = "empty_body")]
    pub private_body: Value,
}

impl Submission {
    pub fn new(identification: impl Into<String>, public_body: Value, private_body: Value) -> Self {
        Self {
            identification: identification.into(),
            public_body,
            private_body,
        }
    }

    /// Parse a raw request body, rejecting oversize input before decoding it.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        check_size(bytes.len())?;
        serde_json::from_slice(bytes).map_err(|e| CoreError::MalformedPayload(e.to_string()))
    }

    /// Check the serialized submission against the ceiling.
    pub fn check_size(&self) -> Result<usize> {
        ensure_within_limit(self)
    }
}

//! Strong type definitions for the Olymp entry store.
//!
//! All identifiers are newtypes to prevent mixing a resource uid with an
//! entry uid at compile time. Both are random 256-bit values rendered as
//! lowercase hex on the wire.

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::CoreError;

/// Length of a uid in bytes.
pub const UID_LEN: usize = 32;

/// Fill a fresh uid from the thread-local CSPRNG.
///
/// `thread_rng` is reseeded from the OS and needs no coordination between
/// threads, so concurrent writers never contend on id generation.
fn random_bytes() -> [u8; UID_LEN] {
    let mut bytes = [0u8; UID_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Generate a fresh opaque identifier as a hex string.
///
/// Used for registration secrets when the caller did not provide one.
pub fn new_id() -> String {
    hex::encode(random_bytes())
}

macro_rules! uid_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; UID_LEN]);

        impl $name {
            /// Generate a new random uid.
            pub fn generate() -> Self {
                Self(random_bytes())
            }

            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; UID_LEN]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; UID_LEN] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex string.
            pub fn from_hex(s: &str) -> Result<Self, CoreError> {
                let bytes = hex::decode(s).map_err(|_| CoreError::InvalidUid(s.to_string()))?;
                let arr: [u8; UID_LEN] = bytes
                    .try_into()
                    .map_err(|_| CoreError::InvalidUid(s.to_string()))?;
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..16])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; UID_LEN]> for $name {
            fn from(bytes: [u8; UID_LEN]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = std::array::TryFromSliceError;

            fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
                let arr: [u8; UID_LEN] = slice.try_into()?;
                Ok(Self(arr))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

uid_type!(
    /// Identifier of a resource (a bucket of entries).
    ResourceUid
);

uid_type!(
    /// Identifier of an entry, unique within its owning resource.
    EntryUid
);

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

//! Resource: a bucket of entries with its own public/private description.
//!
//! A resource is created once and never mutated or deleted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::{Bodies, Provenance};
use crate::types::{now_millis, ResourceUid};

/// A stored resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique for the lifetime of the store.
    pub uid: ResourceUid,
    /// Creation time (Unix ms).
    pub created_at: i64,
    pub public_body: Value,
    pub private_body: Value,
    pub origin_url: String,
    pub user_agent: String,
}

impl Resource {
    /// Build a new resource with a fresh uid and the current time.
    pub fn new(bodies: Bodies, provenance: Provenance) -> Self {
        Self {
            uid: ResourceUid::generate(),
            created_at: now_millis(),
            public_body: bodies.public_body,
            private_body: bodies.private_body,
            origin_url: provenance.origin_url,
            user_agent: provenance.user_agent,
        }
    }

    /// Replace the uid, keeping everything else. Used when a generated uid
    /// collides and the write is retried.
    pub fn with_uid(mut self, uid: ResourceUid) -> Self {
        self.uid = uid;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_resource_carries_fields() {
        let resource = Resource::new(
            Bodies::new(json!({"name": "Con"}), json!({"email": "a@b.ch"})),
            Provenance::new("https://example.ch/form", "curl/8"),
        );
        assert_eq!(resource.public_body, json!({"name": "Con"}));
        assert_eq!(resource.private_body, json!({"email": "a@b.ch"}));
        assert_eq!(resource.origin_url, "https://example.ch/form");
        assert_eq!(resource.user_agent, "curl/8");
        assert!(resource.created_at > 0);
    }

    #[test]
    fn test_new_resources_get_distinct_uids() {
        let a = Resource::new(Bodies::empty(), Provenance::default());
        let b = Resource::new(Bodies::empty(), Provenance::default());
        assert_ne!(a.uid, b.uid);
    }
}

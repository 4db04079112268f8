//! View vectors: fixed records and the exact JSON each caller sees.
//!
//! These pin the wire names and the redaction rules, so a change to either
//! shows up as a failing vector rather than a silent format change.

use serde_json::{json, Value};

use olymp_core::{project, Entry, EntryStatus, EntryUid, ResourceUid};

/// A view test vector.
#[derive(Debug, Clone)]
pub struct ViewVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub entry: Entry,
    pub authenticated: bool,
    /// Expected serialized view.
    pub expected: Value,
}

const RESOURCE: [u8; 32] = [0x11; 32];
const ENTRY: [u8; 32] = [0x22; 32];

fn sample_entry(status: EntryStatus) -> Entry {
    Entry {
        resource_uid: ResourceUid::from_bytes(RESOURCE),
        uid: EntryUid::from_bytes(ENTRY),
        seq: 1,
        created_at: 1_736_870_400_000,
        identification: "sec1".into(),
        public_body: json!({"q": 1}),
        private_body: json!({"ans": "x"}),
        origin_url: "https://rollenspieltage.ch/anmeldung".into(),
        user_agent: "Mozilla/5.0".into(),
        status,
        supersedes: None,
    }
}

/// Get all view vectors.
pub fn all_vectors() -> Vec<ViewVector> {
    let resource_hex = "11".repeat(32);
    let entry_hex = "22".repeat(32);

    vec![
        ViewVector {
            name: "active entry, anonymous",
            entry: sample_entry(EntryStatus::Active),
            authenticated: false,
            expected: json!({
                "resourceUid": resource_hex,
                "entryUid": entry_hex,
                "timestamp": 1_736_870_400_000i64,
                "identification": "",
                "publicBody": {"q": 1},
                "privateBody": {},
                "url": "",
                "userAgent": "",
                "status": "active",
            }),
        },
        ViewVector {
            name: "active entry, authenticated",
            entry: sample_entry(EntryStatus::Active),
            authenticated: true,
            expected: json!({
                "resourceUid": resource_hex,
                "entryUid": entry_hex,
                "timestamp": 1_736_870_400_000i64,
                "identification": "sec1",
                "publicBody": {"q": 1},
                "privateBody": {"ans": "x"},
                "url": "https://rollenspieltage.ch/anmeldung",
                "userAgent": "Mozilla/5.0",
                "status": "active",
            }),
        },
        ViewVector {
            name: "superseded entry keeps its status when redacted",
            entry: sample_entry(EntryStatus::Superseded),
            authenticated: false,
            expected: json!({
                "resourceUid": resource_hex,
                "entryUid": entry_hex,
                "timestamp": 1_736_870_400_000i64,
                "identification": "",
                "publicBody": {"q": 1},
                "privateBody": {},
                "url": "",
                "userAgent": "",
                "status": "superseded",
            }),
        },
    ]
}

/// Project a vector's entry and compare with the expected JSON.
pub fn verify_vector(vector: &ViewVector) -> Result<(), String> {
    let view = project(&vector.entry, vector.authenticated);
    let actual = serde_json::to_value(&view).map_err(|e| e.to_string())?;
    if actual == vector.expected {
        Ok(())
    } else {
        Err(format!(
            "{}: expected {}, got {}",
            vector.name, vector.expected, actual
        ))
    }
}

/// Verify all vectors. Returns the failures.
pub fn verify_all_vectors() -> Vec<String> {
    all_vectors()
        .iter()
        .filter_map(|v| verify_vector(v).err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_hold() {
        let failures = verify_all_vectors();
        assert!(failures.is_empty(), "{failures:#?}");
    }

    #[test]
    fn test_vector_names_are_unique() {
        let vectors = all_vectors();
        let mut names: Vec<_> = vectors.iter().map(|v| v.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }
}

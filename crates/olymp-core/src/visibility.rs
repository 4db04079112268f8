//! Visibility filter: project stored records into response shapes.
//!
//! Every read path goes through [`project`], so the public/private split is
//! decided in one place. Unauthenticated callers see the public body, the
//! uids, the timestamp and the status. Everything else is blanked.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entry::{Entry, EntryStatus};
use crate::payload::empty_body;
use crate::resource::Resource;
use crate::types::{EntryUid, ResourceUid};

/// A record that can be projected for a caller.
pub trait Visible {
    type View;

    /// Project the record. `authenticated == true` is the identity projection.
    fn project(&self, authenticated: bool) -> Self::View;
}

/// Project any visible record.
pub fn project<R: Visible>(record: &R, authenticated: bool) -> R::View {
    record.project(authenticated)
}

/// Project a slice of records with the same access level.
pub fn project_all<R: Visible>(records: &[R], authenticated: bool) -> Vec<R::View> {
    records.iter().map(|r| r.project(authenticated)).collect()
}

fn private_value(value: &Value, authenticated: bool) -> Value {
    if authenticated {
        value.clone()
    } else {
        empty_body()
    }
}

fn private_text(text: &str, authenticated: bool) -> String {
    if authenticated {
        text.to_string()
    } else {
        String::new()
    }
}

/// Response shape of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub resource_uid: ResourceUid,
    pub timestamp: i64,
    pub public_body: Value,
    pub private_body: Value,
    pub url: String,
    pub user_agent: String,
}

impl Visible for Resource {
    type View = ResourceView;

    fn project(&self, authenticated: bool) -> ResourceView {
        ResourceView {
            resource_uid: self.uid,
            timestamp: self.created_at,
            public_body: self.public_body.clone(),
            private_body: private_value(&self.private_body, authenticated),
            url: private_text(&self.origin_url, authenticated),
            user_agent: private_text(&self.user_agent, authenticated),
        }
    }
}

/// Response shape of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub resource_uid: ResourceUid,
    pub entry_uid: EntryUid,
    pub timestamp: i64,
    pub identification: String,
    pub public_body: Value,
    pub private_body: Value,
    pub url: String,
    pub user_agent: String,
    pub status: EntryStatus,
}

impl Visible for Entry {
    type View = EntryView;

    fn project(&self, authenticated: bool) -> EntryView {
        EntryView {
            resource_uid: self.resource_uid,
            entry_uid: self.uid,
            timestamp: self.created_at,
            identification: private_text(&self.identification, authenticated),
            public_body: self.public_body.clone(),
            private_body: private_value(&self.private_body, authenticated),
            url: private_text(&self.origin_url, authenticated),
            user_agent: private_text(&self.user_agent, authenticated),
            status: self.status,
        }
    }
}

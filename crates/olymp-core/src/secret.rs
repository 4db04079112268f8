//! Secret resolution: find the latest entry written under an identification.
//!
//! Latest wins. Among all entries whose identification equals the secret,
//! the one with the greatest log position is returned, whatever its status.
//! An empty secret never matches; anonymous entries share the empty
//! identification and must not be reachable by it.

use std::collections::HashMap;

use crate::entry::Entry;

/// Linear scan over a log in position order.
pub fn resolve_latest<'a>(entries: &'a [Entry], secret: &str) -> Option<&'a Entry> {
    if secret.is_empty() {
        return None;
    }
    entries.iter().rev().find(|e| e.identification == secret)
}

/// Index from identification to the position of its latest entry.
///
/// Updated on every append; must agree exactly with [`resolve_latest`].
#[derive(Debug, Default, Clone)]
pub struct SecretIndex {
    latest: HashMap<String, usize>,
}

impl SecretIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `identification` was written at `position` (0-based).
    ///
    /// Positions only grow, so the newest record always replaces the old one.
    pub fn record(&mut self, identification: &str, position: usize) {
        if identification.is_empty() {
            return;
        }
        self.latest.insert(identification.to_string(), position);
    }

    /// Position of the latest entry for `secret`.
    pub fn lookup(&self, secret: &str) -> Option<usize> {
        if secret.is_empty() {
            return None;
        }
        self.latest.get(secret).copied()
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

//! Credential checking for the single shared credential.
//!
//! Both sides of a comparison are reduced to keyed BLAKE3 digests and the
//! digests compared with `blake3::Hash`'s constant-time equality, so the
//! time taken does not depend on where a guess first differs.

use rand::RngCore;

use crate::config::AuthConfig;

/// Checks `(username, password)` pairs against the configured credential.
pub struct CredentialChecker {
    key: [u8; 32],
    expected: Option<blake3::Hash>,
}

impl CredentialChecker {
    /// Build a checker for the given credential.
    ///
    /// With an empty password every check fails.
    pub fn new(username: &str, password: &str) -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        let expected = (!password.is_empty()).then(|| digest(&key, username, password));
        Self { key, expected }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.username, &config.password)
    }

    /// Whether the pair matches the configured credential.
    pub fn check(&self, username: &str, password: &str) -> bool {
        match &self.expected {
            Some(expected) => digest(&self.key, username, password) == *expected,
            None => false,
        }
    }

    /// Same as [`check`](Self::check) for an optional pair, as taken from a
    /// request that may carry no credentials at all.
    pub fn is_authenticated(&self, credentials: Option<(&str, &str)>) -> bool {
        credentials.is_some_and(|(username, password)| self.check(username, password))
    }
}

impl std::fmt::Debug for CredentialChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialChecker")
            .field("enabled", &self.expected.is_some())
            .finish()
    }
}

// Length-prefix each field so ("ab", "c") and ("a", "bc") hash differently.
fn digest(key: &[u8; 32], username: &str, password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_keyed(key);
    for field in [username, password] {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hasher.finalize()
}

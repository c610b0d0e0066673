use moka::sync::Cache;
use std::time::Duration;

/// Process-local set of logged-off tokens.
///
/// Entries expire after a fixed retention window that does not depend on the token's
/// own expiry. The cache is internally synchronized and evicts expired entries on its
/// own, so it can be shared between workers as is.
#[derive(Clone)]
pub struct RevokedTokens {
    entries: Cache<String, ()>,
}

impl RevokedTokens {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: Cache::builder().time_to_live(retention).build(),
        }
    }

    /// Records `token` as logged off. Revoking an already revoked token restarts its
    /// retention window.
    pub fn revoke(&self, token: &str) {
        self.entries.insert(token.to_owned(), ());
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.entries.get(token).is_some()
    }
}

//! Per-browser session identifier.
//!
//! Generated once (UUID v4), persisted, and reused on every later visit. The
//! remote service scopes cart state by this value.

use tracing::info;
use uuid::Uuid;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the session identifier.
pub const SESSION_KEY: &str = "freshcart_session";

/// Opaque session token sent as `X-Session-Id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Reuse the stored session, or generate and store a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn load_or_create<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, StorageError> {
        if let Some(existing) = store.get(SESSION_KEY)? {
            let existing = existing.trim();
            if !existing.is_empty() {
                return Ok(Self(existing.to_string()));
            }
        }

        let id = Uuid::new_v4().to_string();
        store.set(SESSION_KEY, &id)?;
        info!(session_id = %id, "Generated new session");
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

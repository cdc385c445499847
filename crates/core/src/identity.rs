//! Identity of the user, forwarded to the service with every request.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use uuid::Uuid;

/// The key under which the identity is stored.
pub const IDENTITY_KEY: &str = "user_id";

/// A key-value capability for persisting small strings, such as the user
/// identity, across runs.
pub trait IdentityStore: Send + Sync {
    /// Loads the value for `key`.
    fn load(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn store(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Returns the stored identity, or creates, stores and returns a new one.
///
/// A store failure is not fatal: the new identity is still returned, it
/// just won't survive the process.
pub fn resolve_identity(store: &dyn IdentityStore) -> String {
    if let Some(identity) = store.load(IDENTITY_KEY) {
        let identity = identity.trim();
        if !identity.is_empty() {
            return identity.to_owned();
        }
    }

    let identity = format!("user-{}", Uuid::new_v4());
    debug!("created a new identity: {identity}");
    if let Err(err) = store.store(IDENTITY_KEY, &identity) {
        warn!("failed to persist the identity: {err}");
    }
    identity
}

/// An [`IdentityStore`] that keeps values in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryIdentityStore {
    /// Creates an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self, key: &str) -> Option<String> {
        let values = self.values.lock().ok()?;
        values.get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| io::Error::other("identity store is poisoned"))?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

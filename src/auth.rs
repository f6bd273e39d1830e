use log::{error, warn};

use crate::storage::{KeyValueStore, AUTH_KEY};

/// Persisted logged-in flag. No session token, no expiry.
pub struct AuthFlag<'a, S: ?Sized> {
    storage: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> AuthFlag<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub fn set_authenticated(&self, authenticated: bool) -> bool {
        match self.storage.set(AUTH_KEY, &authenticated.to_string()) {
            Ok(()) => true,
            Err(err) => {
                error!("Failed to save auth flag: {}", err);
                false
            }
        }
    }

    /// `false` when the flag is absent or unreadable.
    pub fn is_authenticated(&self) -> bool {
        let value = match self.storage.get(AUTH_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return false,
            Err(err) => {
                error!("Failed to read auth flag: {}", err);
                return false;
            }
        };

        serde_json::from_str(&value).unwrap_or_else(|err| {
            warn!("Ignoring invalid auth flag {:?}: {}", value, err);
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_to_logged_out() {
        let storage = MemoryStore::new();
        assert!(!AuthFlag::new(&storage).is_authenticated());
    }

    #[test]
    fn set_and_clear() {
        let storage = MemoryStore::new();
        let auth = AuthFlag::new(&storage);

        assert!(auth.set_authenticated(true));
        assert!(auth.is_authenticated());
        assert_eq!(storage.get(AUTH_KEY).unwrap().as_deref(), Some("true"));

        auth.set_authenticated(false);
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn garbage_reads_as_false() {
        let storage = MemoryStore::new();
        for value in ["yes", "1", "\"true\"", ""] {
            storage.set(AUTH_KEY, value).unwrap();
            assert!(!AuthFlag::new(&storage).is_authenticated(), "{value}");
        }
    }
}

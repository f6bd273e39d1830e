//! Key-value storage port.
//!
//! Everything the app persists goes through [`KeyValueStore`], so the backing
//! store can be a JSON file on disk or a map in memory.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

pub const USERS_KEY: &str = "praise_platform_users";
pub const AUTH_KEY: &str = "praise_platform_auth";
pub const SESSION_KEY: &str = "praise_platform_session";
pub const POSTS_KEY: &str = "praise_platform_posts";

/// Sentinel key holding the number of post chunks.
pub fn posts_count_key() -> String {
    format!("{POSTS_KEY}_count")
}

/// Key of the post chunk at `index`.
pub fn posts_chunk_key(index: usize) -> String {
    format!("{POSTS_KEY}_{index}")
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Rejects values larger than `quota` bytes, if a quota is set.
pub(crate) fn check_quota(
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    match quota {
        Some(limit) if value.len() > limit => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            limit,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_keys() {
        assert_eq!(posts_count_key(), "praise_platform_posts_count");
        assert_eq!(posts_chunk_key(0), "praise_platform_posts_0");
        assert_eq!(posts_chunk_key(3), "praise_platform_posts_3");
    }

    #[test]
    fn quota() {
        assert!(check_quota(None, "k", "value").is_ok());
        assert!(check_quota(Some(5), "k", "value").is_ok());
        let err = check_quota(Some(4), "k", "value").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded { size: 5, limit: 4, .. }
        ));
    }
}

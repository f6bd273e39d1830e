use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use log::{debug, info};

use crate::error::StorageError;

use super::{check_quota, KeyValueStore};

/// Store persisted as a single JSON object on disk.
///
/// The whole map is kept in memory and the file is rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            info!("Loading storage {}", path.display());
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            info!("Creating storage {}", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
            quota: None,
        })
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(values)?;
        let mut file = File::create(&self.path)?;
        file.write_all(&data)?;
        debug!("Wrote {} keys to {}", values.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(self.quota, key, value)?;
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush(&values) {
            // keep memory and disk in agreement
            match previous {
                Some(previous) => values.insert(key.to_string(), previous),
                None => values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kudos.json");

        let store = FileStore::open(&path).unwrap();
        store.set("praise_platform_auth", "true").unwrap();
        store.set("other", "x").unwrap();
        store.remove("other").unwrap();
        drop(store);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(
            store.get("praise_platform_auth").unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kudos.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StorageError::Serde(_))
        ));
    }

    #[test]
    fn quota_rejects_large_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("kudos.json"))
            .unwrap()
            .with_quota(8);

        store.set("k", "small").unwrap();
        assert!(matches!(
            store.set("k", "far too large"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
    }
}

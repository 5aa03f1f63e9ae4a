//! File-backed storage: one `<key>.json` file per key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{KeyValueStore, StorageError, validate_key};

/// Storage rooted at a data directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so a crash mid-write never leaves a half-written document.
/// Two processes sharing one directory can still overwrite each other's
/// changes; the last writer wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a data directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;
        debug!(root = %root.display(), "Opened file store");
        Ok(Self { root })
    }

    /// The data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = self.root.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("cc-filestore-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let root = temp_root();
        let store = FileStore::open(&root).unwrap();

        assert_eq!(store.get("cc_cart").unwrap(), None);
        store.set("cc_cart", r#"[{"id":"a"}]"#).unwrap();
        assert!(root.join("cc_cart.json").exists());
        assert!(!root.join("cc_cart.json.tmp").exists());

        let reopened = FileStore::open(&root).unwrap();
        assert_eq!(reopened.get("cc_cart").unwrap().as_deref(), Some(r#"[{"id":"a"}]"#));

        reopened.remove("cc_cart").unwrap();
        assert_eq!(store.get("cc_cart").unwrap(), None);
        reopened.remove("cc_cart").unwrap();

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_rejects_path_traversal() {
        let root = temp_root();
        let store = FileStore::open(&root).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        fs::remove_dir_all(root).unwrap();
    }
}

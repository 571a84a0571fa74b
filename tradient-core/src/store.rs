//! Key-value blob persistence.
use anyhow::{Context, Result};
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A key-value blob store.
///
/// This is the persistence capability handed to the core at
/// construction; the host decides where blobs actually live.
pub trait BlobStore {
    /// Stores `bytes` under `key`, replacing any previous blob.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Reads the blob stored under `key`.
    fn read(&self, key: &str) -> Result<Vec<u8>>;
}

/// A [`BlobStore`] backed by a directory on the local file system.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// failed save never leaves a partially written blob under the key.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create blob store root {:?}", root))?;
        Ok(Self { root })
    }

    fn path_of(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl BlobStore for FsBlobStore {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_of(key);
        let tmp = self.path_of(&format!("{}.tmp", key));
        fs::write(&tmp, bytes).with_context(|| format!("Failed to write blob {:?}", tmp))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move blob into place at {:?}", path))?;
        info!("Saved blob {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_of(key);
        fs::read(&path).with_context(|| format!("Failed to read blob {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_save_read_round_trip() {
        let dir = TempDir::new("blob_store").unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();

        store.save("snapshot", b"payload").unwrap();
        assert_eq!(store.read("snapshot").unwrap(), b"payload");

        // Overwrite under the same key.
        store.save("snapshot", b"other").unwrap();
        assert_eq!(store.read("snapshot").unwrap(), b"other");
    }

    #[test]
    fn test_read_missing_key_fails() {
        let dir = TempDir::new("blob_store").unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();
        assert!(store.read("missing").is_err());
    }
}

//! # File Resource Cache
//!
//! Verified resources on disk, keyed by content hash. A resource is written
//! once and never replaced.

use crate::domain::{ContentHash, StoreError};
use crate::ports::ResourceCache;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Content-addressed cache directory: one file per resource, named by the
/// lowercase hex digest of its bytes.
pub struct FileResourceCache {
    dir: PathBuf,
}

impl FileResourceCache {
    /// Open (creating if needed) the cache directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "Resource cache opened");
        Ok(Self { dir })
    }

    /// Path a resource is stored at.
    pub fn path_for(&self, hash: &ContentHash) -> PathBuf {
        self.dir.join(hash.hex())
    }
}

impl ResourceCache for FileResourceCache {
    fn contains(&self, hash: &ContentHash) -> bool {
        self.path_for(hash).is_file()
    }

    fn store(&self, bytes: &[u8]) -> Result<ContentHash, StoreError> {
        let hash = ContentHash::of(bytes);
        let path = self.path_for(&hash);
        if path.is_file() {
            return Ok(hash);
        }

        // Write atomically via a uniquely named temp file
        let temp_path = self
            .dir
            .join(format!("{}.{:016x}.tmp", hash.hex(), rand::random::<u64>()));
        if let Err(e) = write_then_rename(&temp_path, &path, bytes) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(hash)
    }

    fn load(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(self.path_for(hash)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    std::fs::rename(temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileResourceCache::open(dir.path()).unwrap();

        let hash = cache.store(b"avatar bytes").unwrap();
        assert!(cache.contains(&hash));
        assert_eq!(cache.load(&hash).unwrap(), Some(b"avatar bytes".to_vec()));
        assert_eq!(
            cache.path_for(&hash).file_name().unwrap().to_str().unwrap(),
            ContentHash::of(b"avatar bytes").hex()
        );
    }

    #[test]
    fn test_store_twice_leaves_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileResourceCache::open(dir.path()).unwrap();

        cache.store(b"same").unwrap();
        cache.store(b"same").unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_existing_file_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileResourceCache::open(dir.path()).unwrap();
        let hash = ContentHash::of(b"original");
        std::fs::write(cache.path_for(&hash), b"planted").unwrap();

        cache.store(b"original").unwrap();
        assert_eq!(cache.load(&hash).unwrap(), Some(b"planted".to_vec()));
    }

    #[test]
    fn test_failed_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileResourceCache::open(dir.path()).unwrap();
        let hash = ContentHash::of(b"blocked");
        // A directory at the target path makes the final rename fail
        std::fs::create_dir(cache.path_for(&hash)).unwrap();
        std::fs::write(cache.path_for(&hash).join("occupant"), b"x").unwrap();

        assert!(cache.store(b"blocked").is_err());
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![hash.hex()]);
    }

    #[test]
    fn test_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileResourceCache::open(dir.path().join("nested")).unwrap();
        let hash = ContentHash::of(b"absent");

        assert!(!cache.contains(&hash));
        assert_eq!(cache.load(&hash).unwrap(), None);
    }
}

use crate::StoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Exclusive advisory lock on a file, released on drop.
///
/// Locks are taken per open file description, so two handles in the same
/// process exclude each other just like two processes do.
pub struct StoreLock {
    lock_file: File,
}

impl StoreLock {
    fn open(lock_path: &Path) -> Result<File, StoreError> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(lock_path)?)
    }

    /// Block until the lock is held.
    pub fn acquire(lock_path: &Path) -> Result<Self, StoreError> {
        let file = Self::open(lock_path)?;
        file.lock_exclusive()
            .map_err(|e| StoreError::LockFailed(format!("{}: {e}", lock_path.display())))?;
        Ok(Self { lock_file: file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
    }
}

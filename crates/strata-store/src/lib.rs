//! File-backed storage for Strata environments and sessions.
//!
//! This crate provides the storage layer: `StoreLayout` for directory structure
//! and format versioning, `EnvironmentStore` and `SessionStore` for checksummed
//! record files, `StoreLock` for exclusive per-environment critical sections,
//! `Storage` for the transactional contract the core relies on (conditional
//! state transitions and version compare-and-swap), `SecretVault` for sealed
//! description payloads, and `TaskQueue` for pending deployment intents.

pub mod environments;
pub mod layout;
pub mod lock;
pub mod sessions;
pub mod storage;
pub mod tasks;
pub mod vault;

pub use environments::{validate_env_name, EnvironmentRecord, EnvironmentStore};
pub use layout::{StoreLayout, STORE_FORMAT_VERSION};
pub use lock::StoreLock;
pub use sessions::{sort_most_recent_first, SessionRecord, SessionStore};
pub use storage::Storage;
pub use tasks::{QueuedTask, TaskQueue};
pub use vault::SecretVault;

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// On Linux with ext4 `data=ordered` (the default), renames are usually
/// durable without an explicit dir fsync, but POSIX does not guarantee this.
/// Calling `fsync()` on the parent directory makes the rename durable on
/// all filesystems and mount configurations.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

/// Write `content` to `dest` via a temp file in `dir`, then rename into place.
pub(crate) fn write_atomic(dir: &Path, dest: &Path, content: &[u8]) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
    fsync_dir(dir)?;
    Ok(())
}

/// blake3 over the pretty JSON form of a record whose checksum slot is empty.
pub(crate) fn content_checksum<T: Serialize>(record: &T) -> Result<String, StoreError> {
    let json = serde_json::to_string_pretty(record)?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("integrity check failed for record '{id}': expected {expected}, got {actual}")]
    IntegrityFailure {
        id: String,
        expected: String,
        actual: String,
    },
    #[error("environment not found: {0}")]
    EnvNotFound(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("secret not found: {0}")]
    SecretNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("lock acquisition failed: {0}")]
    LockFailed(String),
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("environment {env_id} is at version {found}, expected {expected}")]
    VersionConflict {
        env_id: String,
        expected: u64,
        found: u64,
    },
    #[error("session {session_id} is {found}, expected {expected}")]
    StateConflict {
        session_id: String,
        expected: String,
        found: String,
    },
    #[error("environment {env_id} has an operation in flight (session {session_id})")]
    OperationInProgress { env_id: String, session_id: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid environment name: {0}")]
    InvalidName(String),
    #[error("name '{name}' is already used by environment {existing_env_id}")]
    NameConflict {
        name: String,
        existing_env_id: String,
    },
    #[error("secret vault error: {0}")]
    Vault(String),
}

impl StoreError {
    /// Whether the error reports a lost race rather than a broken store.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict { .. }
                | StoreError::StateConflict { .. }
                | StoreError::OperationInProgress { .. }
        )
    }
}

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current store format version. Incremented on incompatible layout changes.
pub const STORE_FORMAT_VERSION: u32 = 1;
const VERSION_FILE: &str = "version";

/// Directory layout for a Strata store.
///
/// ```text
/// <root>/store/version
/// <root>/store/environments/<env_id>
/// <root>/store/sessions/<env_id>/<session_id>
/// <root>/store/secrets/<token>
/// <root>/store/tasks/<task_id>.json
/// <root>/store/locks/<env_id>.lock
/// <root>/store/vault.key
/// ```
///
/// Sessions live under their environment's directory so that removing an
/// environment removes everything it owns.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreVersion {
    format_version: u32,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn store_dir(&self) -> PathBuf {
        self.root.join("store")
    }

    #[inline]
    pub fn environments_dir(&self) -> PathBuf {
        self.store_dir().join("environments")
    }

    #[inline]
    pub fn environment_path(&self, env_id: &str) -> PathBuf {
        self.environments_dir().join(env_id)
    }

    #[inline]
    pub fn sessions_root(&self) -> PathBuf {
        self.store_dir().join("sessions")
    }

    #[inline]
    pub fn sessions_dir(&self, env_id: &str) -> PathBuf {
        self.sessions_root().join(env_id)
    }

    #[inline]
    pub fn session_path(&self, env_id: &str, session_id: &str) -> PathBuf {
        self.sessions_dir(env_id).join(session_id)
    }

    #[inline]
    pub fn secrets_dir(&self) -> PathBuf {
        self.store_dir().join("secrets")
    }

    #[inline]
    pub fn tasks_dir(&self) -> PathBuf {
        self.store_dir().join("tasks")
    }

    #[inline]
    pub fn locks_dir(&self) -> PathBuf {
        self.store_dir().join("locks")
    }

    /// Lock file guarding one environment's records.
    #[inline]
    pub fn env_lock_file(&self, env_id: &str) -> PathBuf {
        self.locks_dir().join(format!("{env_id}.lock"))
    }

    /// Lock file guarding store-wide invariants (environment name uniqueness).
    #[inline]
    pub fn lock_file(&self) -> PathBuf {
        self.store_dir().join(".lock")
    }

    #[inline]
    pub fn vault_key_file(&self) -> PathBuf {
        self.store_dir().join("vault.key")
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.environments_dir())?;
        fs::create_dir_all(self.sessions_root())?;
        fs::create_dir_all(self.secrets_dir())?;
        fs::create_dir_all(self.tasks_dir())?;
        fs::create_dir_all(self.locks_dir())?;

        let version_path = self.store_dir().join(VERSION_FILE);
        if version_path.exists() {
            self.verify_version()?;
        } else {
            let ver = StoreVersion {
                format_version: STORE_FORMAT_VERSION,
            };
            let content = serde_json::to_string_pretty(&ver)?;
            crate::write_atomic(&self.store_dir(), &version_path, content.as_bytes())?;
        }

        Ok(())
    }

    pub fn verify_version(&self) -> Result<(), StoreError> {
        let version_path = self.store_dir().join(VERSION_FILE);
        let content = fs::read_to_string(&version_path)?;
        let ver: StoreVersion = serde_json::from_str(&content)?;

        if ver.format_version != STORE_FORMAT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: STORE_FORMAT_VERSION,
                found: ver.format_version,
            });
        }
        Ok(())
    }
}

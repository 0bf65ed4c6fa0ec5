use crate::layout::StoreLayout;
use crate::{content_checksum, write_atomic, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use strata_schema::{EnvId, SessionId, TenantId};

/// Persisted form of an environment.
///
/// `description` holds the stored payload exactly as written: plaintext JSON,
/// or a secret reference token when encryption was enabled at write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentRecord {
    pub id: EnvId,
    pub name: String,
    pub tenant_id: TenantId,
    pub version: u64,
    pub description: Value,
    /// Session whose deployment produced `version`. `None` until the first commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_session: Option<SessionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// blake3 checksum for integrity verification. `None` for hand-written records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl EnvironmentRecord {
    pub fn new(id: EnvId, name: &str, tenant_id: TenantId, description: Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.to_owned(),
            tenant_id,
            version: 0,
            description,
            committed_session: None,
            created_at: now,
            updated_at: now,
            checksum: None,
        }
    }

    fn compute_checksum(&self) -> Result<String, StoreError> {
        let mut copy = self.clone();
        copy.checksum = None;
        content_checksum(&copy)
    }
}

pub fn validate_env_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.len() > 64 {
        return Err(StoreError::InvalidName(
            "environment name must be 1-64 characters".to_owned(),
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(StoreError::InvalidName(
            "environment name must match [a-zA-Z0-9_-]".to_owned(),
        ));
    }
    Ok(())
}

/// Raw record access for environments. Performs no locking; callers needing
/// read-check-write atomicity go through [`crate::Storage`].
pub struct EnvironmentStore {
    layout: StoreLayout,
}

impl EnvironmentStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn put(&self, record: &EnvironmentRecord) -> Result<(), StoreError> {
        let mut sealed = record.clone();
        sealed.checksum = Some(record.compute_checksum()?);
        let content = serde_json::to_string_pretty(&sealed)?;
        write_atomic(
            &self.layout.environments_dir(),
            &self.layout.environment_path(&record.id),
            content.as_bytes(),
        )
    }

    pub fn get(&self, env_id: &str) -> Result<EnvironmentRecord, StoreError> {
        let path = self.layout.environment_path(env_id);
        if !path.exists() {
            return Err(StoreError::EnvNotFound(env_id.to_owned()));
        }
        let content = fs::read_to_string(&path)?;
        let record: EnvironmentRecord = serde_json::from_str(&content)?;

        if let Some(ref expected) = record.checksum {
            let actual = record.compute_checksum()?;
            if actual != *expected {
                return Err(StoreError::IntegrityFailure {
                    id: env_id.to_owned(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(record)
    }

    /// Remove the environment record and every session it owns.
    /// Returns whether anything was present.
    pub fn remove(&self, env_id: &str) -> Result<bool, StoreError> {
        let mut removed = false;
        let path = self.layout.environment_path(env_id);
        if path.exists() {
            fs::remove_file(path)?;
            removed = true;
        }
        let sessions = self.layout.sessions_dir(env_id);
        if sessions.exists() {
            fs::remove_dir_all(sessions)?;
            removed = true;
        }
        Ok(removed)
    }

    /// All readable environments, oldest first. Corrupt records are skipped.
    pub fn list(&self) -> Result<Vec<EnvironmentRecord>, StoreError> {
        let dir = self.layout.environments_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name_str = name.to_str().unwrap_or("");
            if name_str.starts_with('.') {
                continue;
            }
            match self.get(name_str) {
                Ok(record) => results.push(record),
                Err(e) => {
                    tracing::warn!("skipping corrupted environment record '{name_str}': {e}");
                }
            }
        }
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(results)
    }

    pub fn find_by_name(
        &self,
        tenant_id: &TenantId,
        name: &str,
    ) -> Result<Option<EnvironmentRecord>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|r| r.tenant_id == *tenant_id && r.name == name))
    }
}

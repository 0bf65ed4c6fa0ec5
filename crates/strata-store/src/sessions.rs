use crate::layout::StoreLayout;
use crate::{content_checksum, write_atomic, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use strata_schema::{EnvId, SessionId, SessionState, UserId};

/// Persisted form of an editing session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub environment_id: EnvId,
    pub user_id: UserId,
    /// Environment version at open time. Never changes afterwards.
    pub version: u64,
    pub state: SessionState,
    /// Stored draft payload, see [`crate::EnvironmentRecord::description`].
    pub description: Value,
    pub created_at: DateTime<Utc>,
    /// Last state or description change; tie-break for recency ordering.
    pub updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl SessionRecord {
    fn compute_checksum(&self) -> Result<String, StoreError> {
        let mut copy = self.clone();
        copy.checksum = None;
        content_checksum(&copy)
    }

    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }
}

/// Order sessions most recent first: higher captured version wins, then the
/// later `updated`, then the id so the order is total.
pub fn sort_most_recent_first(sessions: &mut [SessionRecord]) {
    sessions.sort_by(|a, b| {
        b.version
            .cmp(&a.version)
            .then(b.updated.cmp(&a.updated))
            .then(b.id.cmp(&a.id))
    });
}

/// Raw record access for sessions. Performs no locking.
pub struct SessionStore {
    layout: StoreLayout,
}

impl SessionStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut sealed = record.clone();
        sealed.checksum = Some(record.compute_checksum()?);
        let content = serde_json::to_string_pretty(&sealed)?;
        write_atomic(
            &self.layout.sessions_dir(&record.environment_id),
            &self.layout.session_path(&record.environment_id, &record.id),
            content.as_bytes(),
        )
    }

    /// Locate a session file without knowing its environment.
    fn locate(&self, session_id: &str) -> Result<Option<PathBuf>, StoreError> {
        let root = self.layout.sessions_root();
        if !root.exists() {
            return Ok(None);
        }
        for entry in fs::read_dir(root)? {
            let candidate = entry?.path().join(session_id);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    fn read(&self, path: &std::path::Path, session_id: &str) -> Result<SessionRecord, StoreError> {
        let content = fs::read_to_string(path)?;
        let record: SessionRecord = serde_json::from_str(&content)?;
        if let Some(ref expected) = record.checksum {
            let actual = record.compute_checksum()?;
            if actual != *expected {
                return Err(StoreError::IntegrityFailure {
                    id: session_id.to_owned(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(record)
    }

    pub fn get(&self, session_id: &str) -> Result<SessionRecord, StoreError> {
        let path = self
            .locate(session_id)?
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_owned()))?;
        self.read(&path, session_id)
    }

    /// Every readable session of one environment, in directory order.
    /// Unreadable records are logged and skipped.
    pub fn list(&self, env_id: &str) -> Result<Vec<SessionRecord>, StoreError> {
        self.scan(env_id, false)
    }

    /// Every session of one environment. Fails on the first record that cannot
    /// be read or does not match its checksum.
    pub fn list_strict(&self, env_id: &str) -> Result<Vec<SessionRecord>, StoreError> {
        self.scan(env_id, true)
    }

    fn scan(&self, env_id: &str, strict: bool) -> Result<Vec<SessionRecord>, StoreError> {
        let dir = self.layout.sessions_dir(env_id);
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
            match self.read(&entry.path(), name_str) {
                Ok(record) => results.push(record),
                Err(e) if strict => return Err(e),
                Err(e) => tracing::warn!("skipping corrupted session record '{name_str}': {e}"),
            }
        }
        Ok(results)
    }

    pub fn remove(&self, session_id: &str) -> Result<bool, StoreError> {
        match self.locate(session_id)? {
            Some(path) => {
                fs::remove_file(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

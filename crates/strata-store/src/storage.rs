use crate::environments::{validate_env_name, EnvironmentRecord, EnvironmentStore};
use crate::layout::StoreLayout;
use crate::lock::StoreLock;
use crate::sessions::{sort_most_recent_first, SessionRecord, SessionStore};
use crate::StoreError;
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use strata_schema::{SessionId, SessionState, TenantId, UserId};
use tracing::{debug, info, warn};

/// Transactional access to environments and their sessions.
///
/// Every read-check-write on an environment's records runs while holding that
/// environment's [`StoreLock`]. The lock is a file lock, so the guarantees hold
/// across threads and processes sharing the store directory. Nothing in here
/// talks to the secret store; payloads arrive already in stored form.
pub struct Storage {
    layout: StoreLayout,
    environments: EnvironmentStore,
    sessions: SessionStore,
}

impl Storage {
    pub fn new(layout: StoreLayout) -> Self {
        let environments = EnvironmentStore::new(layout.clone());
        let sessions = SessionStore::new(layout.clone());
        Self {
            layout,
            environments,
            sessions,
        }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Lock an existing environment. A missing environment leaves no lock
    /// file behind.
    fn lock_env(&self, env_id: &str) -> Result<StoreLock, StoreError> {
        let record = self.layout.environment_path(env_id);
        if !record.exists() {
            return Err(StoreError::EnvNotFound(env_id.to_owned()));
        }
        let lock = StoreLock::acquire(&self.layout.env_lock_file(env_id))?;
        if !record.exists() {
            self.discard_env_lock_file(env_id);
            return Err(StoreError::EnvNotFound(env_id.to_owned()));
        }
        Ok(lock)
    }

    fn lock_store(&self) -> Result<StoreLock, StoreError> {
        StoreLock::acquire(&self.layout.lock_file())
    }

    // ---- environments -------------------------------------------------

    pub fn get_environment(&self, env_id: &str) -> Result<EnvironmentRecord, StoreError> {
        self.environments.get(env_id)
    }

    pub fn list_environments(&self) -> Result<Vec<EnvironmentRecord>, StoreError> {
        self.environments.list()
    }

    /// Insert a new environment. Names are unique per tenant.
    pub fn create_environment(&self, record: &EnvironmentRecord) -> Result<(), StoreError> {
        validate_env_name(&record.name)?;
        let _store = self.lock_store()?;
        if let Some(existing) = self
            .environments
            .find_by_name(&record.tenant_id, &record.name)?
        {
            return Err(StoreError::NameConflict {
                name: record.name.clone(),
                existing_env_id: existing.id.into_inner(),
            });
        }
        let _env = StoreLock::acquire(&self.layout.env_lock_file(&record.id))?;
        self.environments.put(record)?;
        info!("created environment {} ('{}')", record.id, record.name);
        Ok(())
    }

    pub fn rename_environment(
        &self,
        env_id: &str,
        name: &str,
    ) -> Result<EnvironmentRecord, StoreError> {
        validate_env_name(name)?;
        let _store = self.lock_store()?;
        let _env = self.lock_env(env_id)?;
        let mut record = self.environments.get(env_id)?;
        if let Some(existing) = self.environments.find_by_name(&record.tenant_id, name)? {
            if existing.id != record.id {
                return Err(StoreError::NameConflict {
                    name: name.to_owned(),
                    existing_env_id: existing.id.into_inner(),
                });
            }
        }
        record.name = name.to_owned();
        record.updated_at = Utc::now();
        self.environments.put(&record)?;
        Ok(record)
    }

    /// Replace the committed description without bumping the version.
    ///
    /// Refused when the environment moved past `expected_version` or when a
    /// session is deploying or deleting.
    pub fn replace_environment_description(
        &self,
        env_id: &str,
        expected_version: u64,
        description: Value,
    ) -> Result<EnvironmentRecord, StoreError> {
        let _env = self.lock_env(env_id)?;
        let mut record = self.environments.get(env_id)?;
        if record.version != expected_version {
            return Err(StoreError::VersionConflict {
                env_id: env_id.to_owned(),
                expected: expected_version,
                found: record.version,
            });
        }
        if let Some(busy) = self.in_flight_sibling(env_id, None)? {
            return Err(StoreError::OperationInProgress {
                env_id: env_id.to_owned(),
                session_id: busy.into_inner(),
            });
        }
        record.description = description;
        record.updated_at = Utc::now();
        self.environments.put(&record)?;
        Ok(record)
    }

    /// Compare-and-swap the committed version. Fails with `VersionConflict`
    /// unless the environment is currently at `expected_old`.
    pub fn update_environment_version(
        &self,
        env_id: &str,
        expected_old: u64,
        new_version: u64,
        new_description: Value,
    ) -> Result<EnvironmentRecord, StoreError> {
        let _env = self.lock_env(env_id)?;
        self.swap_version_locked(env_id, expected_old, new_version, new_description, None)
    }

    fn swap_version_locked(
        &self,
        env_id: &str,
        expected_old: u64,
        new_version: u64,
        new_description: Value,
        committed_by: Option<&SessionId>,
    ) -> Result<EnvironmentRecord, StoreError> {
        let mut record = self.environments.get(env_id)?;
        if record.version != expected_old || new_version <= expected_old {
            return Err(StoreError::VersionConflict {
                env_id: env_id.to_owned(),
                expected: expected_old,
                found: record.version,
            });
        }
        record.version = new_version;
        record.description = new_description;
        if let Some(session_id) = committed_by {
            record.committed_session = Some(session_id.clone());
        }
        record.updated_at = Utc::now();
        self.environments.put(&record)?;
        debug!("environment {env_id} version {expected_old} -> {new_version}");
        Ok(record)
    }

    /// Remove an environment and its sessions. Absent environments are not an error.
    pub fn remove_environment(&self, env_id: &str) -> Result<bool, StoreError> {
        let _env = match self.lock_env(env_id) {
            Ok(lock) => lock,
            Err(StoreError::EnvNotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        let removed = self.environments.remove(env_id)?;
        if removed {
            self.discard_env_lock_file(env_id);
            info!("removed environment {env_id}");
        }
        Ok(removed)
    }

    /// Unlink the lock file of a removed environment. Called with the lock
    /// held. Environment ids are never reused, so a waiter that later locks
    /// the unlinked file only finds the environment gone.
    fn discard_env_lock_file(&self, env_id: &str) {
        match fs::remove_file(self.layout.env_lock_file(env_id)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("could not remove lock file of environment {env_id}: {e}"),
        }
    }

    // ---- sessions -----------------------------------------------------

    pub fn get_session(&self, session_id: &str) -> Result<SessionRecord, StoreError> {
        self.sessions.get(session_id)
    }

    /// Sessions of one environment, most recent first, optionally of one state.
    pub fn list_sessions(
        &self,
        env_id: &str,
        state: Option<SessionState>,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let mut sessions = self.sessions.list(env_id)?;
        if let Some(state) = state {
            sessions.retain(|s| s.state == state);
        }
        sort_most_recent_first(&mut sessions);
        Ok(sessions)
    }

    /// Open a session snapshotting the environment's current version and
    /// stored description.
    pub fn create_session(
        &self,
        env_id: &str,
        user_id: &UserId,
    ) -> Result<SessionRecord, StoreError> {
        let _env = self.lock_env(env_id)?;
        let environment = self.environments.get(env_id)?;
        let now = Utc::now();
        let record = SessionRecord {
            id: SessionId::generate(),
            environment_id: environment.id,
            user_id: user_id.clone(),
            version: environment.version,
            state: SessionState::Opened,
            description: environment.description,
            created_at: now,
            updated: now,
            checksum: None,
        };
        self.sessions.put(&record)?;
        debug!(
            "opened session {} on {env_id} at version {}",
            record.id, record.version
        );
        Ok(record)
    }

    /// Persist a new stored draft. Only `OPENED` sessions accept edits.
    pub fn save_session_description(
        &self,
        session_id: &str,
        description: Value,
    ) -> Result<SessionRecord, StoreError> {
        let env_id = self.sessions.get(session_id)?.environment_id;
        let _env = self.lock_env(&env_id)?;
        let mut record = self.sessions.get(session_id)?;
        if record.state != SessionState::Opened {
            return Err(StoreError::StateConflict {
                session_id: session_id.to_owned(),
                expected: SessionState::Opened.to_string(),
                found: record.state.to_string(),
            });
        }
        record.description = description;
        record.touch();
        self.sessions.put(&record)?;
        Ok(record)
    }

    /// Move a session from `from` to `to`, failing with `StateConflict` if it
    /// is no longer in `from`.
    pub fn transition_session_state(
        &self,
        session_id: &str,
        from: SessionState,
        to: SessionState,
    ) -> Result<SessionRecord, StoreError> {
        let env_id = self.sessions.get(session_id)?.environment_id;
        let _env = self.lock_env(&env_id)?;
        self.transition_locked(session_id, from, to)
    }

    fn transition_locked(
        &self,
        session_id: &str,
        from: SessionState,
        to: SessionState,
    ) -> Result<SessionRecord, StoreError> {
        let mut record = self.sessions.get(session_id)?;
        if record.state != from {
            return Err(StoreError::StateConflict {
                session_id: session_id.to_owned(),
                expected: from.to_string(),
                found: record.state.to_string(),
            });
        }
        record.state = to;
        record.touch();
        self.sessions.put(&record)?;
        debug!("session {session_id}: {from} -> {to}");
        Ok(record)
    }

    /// Conditionally move a session into `to` (deploying or deleting).
    ///
    /// In one critical section the session must be claimable and no sibling
    /// may be deploying or deleting. An `OPENED` session is claimable while
    /// the environment is still at its captured version. A `DEPLOYED`
    /// session is claimable only for deletion, and only while it is the
    /// environment's committed session. This is the single-deployer gate.
    pub fn claim_session(
        &self,
        session_id: &str,
        to: SessionState,
    ) -> Result<SessionRecord, StoreError> {
        let env_id = self.sessions.get(session_id)?.environment_id;
        let _env = self.lock_env(&env_id)?;

        let session = self.sessions.get(session_id)?;
        let environment = self.environments.get(&env_id)?;
        match session.state {
            SessionState::Opened if environment.version != session.version => {
                return Err(StoreError::VersionConflict {
                    env_id: env_id.into_inner(),
                    expected: session.version,
                    found: environment.version,
                });
            }
            SessionState::Opened => {}
            SessionState::Deployed if to == SessionState::Deleting => {
                if environment.committed_session.as_ref() != Some(&session.id) {
                    return Err(StoreError::VersionConflict {
                        env_id: env_id.into_inner(),
                        expected: session.version + 1,
                        found: environment.version,
                    });
                }
            }
            other => {
                return Err(StoreError::StateConflict {
                    session_id: session_id.to_owned(),
                    expected: SessionState::Opened.to_string(),
                    found: other.to_string(),
                });
            }
        }
        if let Some(busy) = self.in_flight_sibling(&env_id, Some(&session.id))? {
            return Err(StoreError::OperationInProgress {
                env_id: env_id.into_inner(),
                session_id: busy.into_inner(),
            });
        }
        let claimed = self.transition_locked(session_id, session.state, to)?;
        info!("session {session_id} claimed {to} on environment {env_id}");
        Ok(claimed)
    }

    /// A session other than `except` that is deploying or deleting. A session
    /// record that cannot be verified fails the check instead of being skipped.
    fn in_flight_sibling(
        &self,
        env_id: &str,
        except: Option<&SessionId>,
    ) -> Result<Option<SessionId>, StoreError> {
        Ok(self
            .sessions
            .list_strict(env_id)?
            .into_iter()
            .find(|s| s.state.is_in_flight() && Some(&s.id) != except)
            .map(|s| s.id))
    }

    /// Commit a successful deployment: bump the environment version from the
    /// session's captured version, adopt the session's draft as the committed
    /// description, and mark the session `DEPLOYED`, all under one lock.
    pub fn complete_deployment(
        &self,
        session_id: &str,
    ) -> Result<(EnvironmentRecord, SessionRecord), StoreError> {
        let env_id = self.sessions.get(session_id)?.environment_id;
        let _env = self.lock_env(&env_id)?;

        let session = self.sessions.get(session_id)?;
        if session.state != SessionState::Deploying {
            return Err(StoreError::StateConflict {
                session_id: session_id.to_owned(),
                expected: SessionState::Deploying.to_string(),
                found: session.state.to_string(),
            });
        }
        let environment = self.swap_version_locked(
            &env_id,
            session.version,
            session.version + 1,
            session.description.clone(),
            Some(&session.id),
        )?;
        let session =
            self.transition_locked(session_id, SessionState::Deploying, SessionState::Deployed)?;
        info!(
            "environment {env_id} committed version {} from session {session_id}",
            environment.version
        );
        Ok((environment, session))
    }

    /// Finish a successful teardown: mark the session `DELETED` and remove the
    /// environment together with all of its sessions.
    pub fn complete_deletion(&self, session_id: &str) -> Result<SessionRecord, StoreError> {
        let env_id = self.sessions.get(session_id)?.environment_id;
        let _env = self.lock_env(&env_id)?;
        let session =
            self.transition_locked(session_id, SessionState::Deleting, SessionState::Deleted)?;
        self.environments.remove(&env_id)?;
        self.discard_env_lock_file(&env_id);
        info!("environment {env_id} deleted by session {session_id}");
        Ok(session)
    }

    /// Remove a session record. Sessions that are deploying or deleting stay.
    pub fn remove_session(&self, session_id: &str) -> Result<(), StoreError> {
        let env_id = self.sessions.get(session_id)?.environment_id;
        let _env = self.lock_env(&env_id)?;
        let session = self.sessions.get(session_id)?;
        if session.state.is_in_flight() {
            return Err(StoreError::OperationInProgress {
                env_id: env_id.into_inner(),
                session_id: session_id.to_owned(),
            });
        }
        self.sessions.remove(session_id)?;
        Ok(())
    }

    pub fn environments_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<EnvironmentRecord>, StoreError> {
        Ok(self
            .environments
            .list()?
            .into_iter()
            .filter(|r| r.tenant_id == *tenant_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use strata_schema::EnvId;

    fn setup() -> (tempfile::TempDir, Storage, EnvId) {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        let storage = Storage::new(layout);
        let id = EnvId::generate();
        let record = EnvironmentRecord::new(
            id.clone(),
            "web",
            TenantId::new("acme"),
            json!({ "Objects": { "name": "web" } }),
        );
        storage.create_environment(&record).unwrap();
        (dir, storage, id)
    }

    fn user() -> UserId {
        UserId::new("alice")
    }

    #[test]
    fn create_session_snapshots_environment() {
        let (_dir, storage, env) = setup();
        let s = storage.create_session(&env, &user()).unwrap();
        assert_eq!(s.version, 0);
        assert_eq!(s.state, SessionState::Opened);
        assert_eq!(s.description["Objects"]["name"], "web");
    }

    #[test]
    fn create_session_on_missing_environment_fails() {
        let (_dir, storage, _env) = setup();
        assert!(matches!(
            storage.create_session("missing", &user()),
            Err(StoreError::EnvNotFound(_))
        ));
    }

    #[test]
    fn duplicate_name_in_tenant_is_rejected() {
        let (_dir, storage, _env) = setup();
        let other = EnvironmentRecord::new(
            EnvId::generate(),
            "web",
            TenantId::new("acme"),
            json!({}),
        );
        assert!(matches!(
            storage.create_environment(&other),
            Err(StoreError::NameConflict { .. })
        ));
        let elsewhere =
            EnvironmentRecord::new(EnvId::generate(), "web", TenantId::new("beta"), json!({}));
        storage.create_environment(&elsewhere).unwrap();
    }

    #[test]
    fn claim_allows_only_one_in_flight() {
        let (_dir, storage, env) = setup();
        let a = storage.create_session(&env, &user()).unwrap();
        let b = storage.create_session(&env, &user()).unwrap();

        storage.claim_session(&a.id, SessionState::Deploying).unwrap();
        assert!(matches!(
            storage.claim_session(&b.id, SessionState::Deploying),
            Err(StoreError::OperationInProgress { .. })
        ));
    }

    #[test]
    fn corrupt_in_flight_session_blocks_claims() {
        let (_dir, storage, env) = setup();
        let a = storage.create_session(&env, &user()).unwrap();
        let b = storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&a.id, SessionState::Deploying).unwrap();

        let path = storage.layout().session_path(&env, &a.id);
        let tampered = fs::read_to_string(&path)
            .unwrap()
            .replace("\"alice\"", "\"mallory\"");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            storage.claim_session(&b.id, SessionState::Deploying),
            Err(StoreError::IntegrityFailure { .. })
        ));
        assert!(matches!(
            storage.replace_environment_description(&env, 0, json!({})),
            Err(StoreError::IntegrityFailure { .. })
        ));
        assert_eq!(storage.get_session(&b.id).unwrap().state, SessionState::Opened);
    }

    #[test]
    fn claim_rejects_stale_session() {
        let (_dir, storage, env) = setup();
        let a = storage.create_session(&env, &user()).unwrap();
        let b = storage.create_session(&env, &user()).unwrap();

        storage.claim_session(&a.id, SessionState::Deploying).unwrap();
        storage.complete_deployment(&a.id).unwrap();

        assert!(matches!(
            storage.claim_session(&b.id, SessionState::Deploying),
            Err(StoreError::VersionConflict {
                expected: 0,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn complete_deployment_bumps_version_and_adopts_draft() {
        let (_dir, storage, env) = setup();
        let s = storage.create_session(&env, &user()).unwrap();
        storage
            .save_session_description(&s.id, json!({ "Objects": { "name": "v2" } }))
            .unwrap();
        storage.claim_session(&s.id, SessionState::Deploying).unwrap();
        let (environment, session) = storage.complete_deployment(&s.id).unwrap();

        assert_eq!(environment.version, 1);
        assert_eq!(environment.description["Objects"]["name"], "v2");
        assert_eq!(environment.committed_session.as_ref(), Some(&s.id));
        assert_eq!(session.state, SessionState::Deployed);
    }

    #[test]
    fn complete_deployment_requires_deploying() {
        let (_dir, storage, env) = setup();
        let s = storage.create_session(&env, &user()).unwrap();
        assert!(matches!(
            storage.complete_deployment(&s.id),
            Err(StoreError::StateConflict { .. })
        ));
        assert_eq!(storage.get_environment(&env).unwrap().version, 0);
    }

    #[test]
    fn version_cas_rejects_mismatch() {
        let (_dir, storage, env) = setup();
        storage
            .update_environment_version(&env, 0, 1, json!({}))
            .unwrap();
        assert!(matches!(
            storage.update_environment_version(&env, 0, 1, json!({})),
            Err(StoreError::VersionConflict { found: 1, .. })
        ));
    }

    #[test]
    fn version_cas_refuses_to_go_backwards() {
        let (_dir, storage, env) = setup();
        assert!(storage
            .update_environment_version(&env, 0, 0, json!({}))
            .is_err());
    }

    #[test]
    fn transition_checks_source_state() {
        let (_dir, storage, env) = setup();
        let s = storage.create_session(&env, &user()).unwrap();
        assert!(matches!(
            storage.transition_session_state(
                &s.id,
                SessionState::Deploying,
                SessionState::Deployed
            ),
            Err(StoreError::StateConflict { .. })
        ));
    }

    #[test]
    fn edits_rejected_after_claim() {
        let (_dir, storage, env) = setup();
        let s = storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&s.id, SessionState::Deploying).unwrap();
        assert!(matches!(
            storage.save_session_description(&s.id, json!({})),
            Err(StoreError::StateConflict { .. })
        ));
    }

    #[test]
    fn complete_deletion_removes_environment() {
        let (_dir, storage, env) = setup();
        let s = storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&s.id, SessionState::Deleting).unwrap();
        let done = storage.complete_deletion(&s.id).unwrap();
        assert_eq!(done.state, SessionState::Deleted);
        assert!(matches!(
            storage.get_environment(&env),
            Err(StoreError::EnvNotFound(_))
        ));
        assert!(!storage.remove_environment(&env).unwrap());
        assert!(!storage.layout().env_lock_file(&env).exists());
    }

    #[test]
    fn committed_session_can_be_claimed_for_deletion_only() {
        let (_dir, storage, env) = setup();
        let a = storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&a.id, SessionState::Deploying).unwrap();
        storage.complete_deployment(&a.id).unwrap();

        assert!(matches!(
            storage.claim_session(&a.id, SessionState::Deploying),
            Err(StoreError::StateConflict { .. })
        ));
        let claimed = storage.claim_session(&a.id, SessionState::Deleting).unwrap();
        assert_eq!(claimed.state, SessionState::Deleting);
        storage.complete_deletion(&a.id).unwrap();
        assert!(matches!(
            storage.get_environment(&env),
            Err(StoreError::EnvNotFound(_))
        ));
    }

    #[test]
    fn superseded_deployed_session_cannot_claim_deletion() {
        let (_dir, storage, env) = setup();
        let a = storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&a.id, SessionState::Deploying).unwrap();
        storage.complete_deployment(&a.id).unwrap();
        let b = storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&b.id, SessionState::Deploying).unwrap();
        storage.complete_deployment(&b.id).unwrap();

        assert!(matches!(
            storage.claim_session(&a.id, SessionState::Deleting),
            Err(StoreError::VersionConflict { found: 2, .. })
        ));
        assert_eq!(storage.get_session(&a.id).unwrap().state, SessionState::Deployed);
    }

    #[test]
    fn remove_environment_discards_its_lock_file() {
        let (_dir, storage, env) = setup();
        storage.create_session(&env, &user()).unwrap();
        assert!(storage.layout().env_lock_file(&env).exists());

        assert!(storage.remove_environment(&env).unwrap());
        assert!(!storage.layout().env_lock_file(&env).exists());
        assert!(matches!(
            storage.create_session(&env, &user()),
            Err(StoreError::EnvNotFound(_))
        ));
        assert!(!storage.layout().env_lock_file(&env).exists());
    }

    #[test]
    fn in_flight_sessions_cannot_be_removed() {
        let (_dir, storage, env) = setup();
        let s = storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&s.id, SessionState::Deploying).unwrap();
        assert!(storage.remove_session(&s.id).is_err());
        storage
            .transition_session_state(&s.id, SessionState::Deploying, SessionState::DeployFailure)
            .unwrap();
        storage.remove_session(&s.id).unwrap();
        assert!(storage.get_session(&s.id).is_err());
    }

    #[test]
    fn list_sessions_filters_by_state() {
        let (_dir, storage, env) = setup();
        let a = storage.create_session(&env, &user()).unwrap();
        storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&a.id, SessionState::Deploying).unwrap();

        assert_eq!(storage.list_sessions(&env, None).unwrap().len(), 2);
        let deploying = storage
            .list_sessions(&env, Some(SessionState::Deploying))
            .unwrap();
        assert_eq!(deploying.len(), 1);
        assert_eq!(deploying[0].id, a.id);
    }

    #[test]
    fn replace_description_blocked_while_in_flight() {
        let (_dir, storage, env) = setup();
        let s = storage.create_session(&env, &user()).unwrap();
        storage.claim_session(&s.id, SessionState::Deploying).unwrap();
        assert!(matches!(
            storage.replace_environment_description(&env, 0, json!({})),
            Err(StoreError::OperationInProgress { .. })
        ));
    }

    #[test]
    fn rename_enforces_uniqueness() {
        let (_dir, storage, env) = setup();
        let other = EnvironmentRecord::new(
            EnvId::generate(),
            "api",
            TenantId::new("acme"),
            json!({}),
        );
        storage.create_environment(&other).unwrap();
        assert!(storage.rename_environment(&other.id, "web").is_err());
        assert_eq!(
            storage.rename_environment(&env, "web").unwrap().name,
            "web"
        );
        assert_eq!(
            storage.rename_environment(&env, "frontend").unwrap().name,
            "frontend"
        );
    }
}

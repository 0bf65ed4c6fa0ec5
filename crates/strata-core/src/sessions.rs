use crate::deployment::{intent_for, DeploymentOutcome, DeploymentSubmitter};
use crate::lifecycle::validate_transition;
use crate::payload::{PayloadAdapter, PayloadKind};
use crate::CoreError;
use serde_json::Value;
use std::sync::Arc;
use strata_schema::{DeploymentIntent, RequestContext, SessionState, UserId};
use strata_store::{SessionRecord, Storage};
use tracing::{error, info, warn};

/// Editing sessions: open, edit, validate, deploy, and report outcomes.
///
/// Records returned by this service carry plaintext drafts unless noted
/// otherwise. Secret-store traffic always happens before or after the storage
/// critical sections, never inside them.
pub struct SessionService {
    storage: Arc<Storage>,
    payloads: Arc<PayloadAdapter>,
    submitter: Arc<dyn DeploymentSubmitter>,
}

impl SessionService {
    pub fn new(
        storage: Arc<Storage>,
        payloads: Arc<PayloadAdapter>,
        submitter: Arc<dyn DeploymentSubmitter>,
    ) -> Self {
        Self {
            storage,
            payloads,
            submitter,
        }
    }

    fn decode(
        &self,
        mut record: SessionRecord,
        ctx: &RequestContext,
    ) -> Result<SessionRecord, CoreError> {
        let stored = std::mem::take(&mut record.description);
        record.description = self
            .payloads
            .load(PayloadKind::Session, &record.id, stored, ctx)?;
        Ok(record)
    }

    /// Open a session on the environment's current version.
    ///
    /// The returned record holds the draft in stored form; use [`Self::get`]
    /// for the plaintext.
    pub fn create(&self, env_id: &str, user_id: &UserId) -> Result<SessionRecord, CoreError> {
        let session = self.storage.create_session(env_id, user_id)?;
        info!(
            "user {user_id} opened session {} on environment {env_id} at version {}",
            session.id, session.version
        );
        Ok(session)
    }

    pub fn get(&self, session_id: &str, ctx: &RequestContext) -> Result<SessionRecord, CoreError> {
        let record = self.storage.get_session(session_id)?;
        self.decode(record, ctx)
    }

    /// Sessions of an environment, most recent first.
    pub fn list(
        &self,
        env_id: &str,
        state: Option<SessionState>,
        ctx: &RequestContext,
    ) -> Result<Vec<SessionRecord>, CoreError> {
        // Distinguish an unknown environment from one without sessions.
        self.storage.get_environment(env_id)?;
        self.storage
            .list_sessions(env_id, state)?
            .into_iter()
            .map(|s| self.decode(s, ctx))
            .collect()
    }

    /// Persist the draft carried by `session`.
    ///
    /// The payload is sealed before anything is written, so a secret-store
    /// failure leaves the stored session untouched.
    pub fn save(
        &self,
        session: &SessionRecord,
        ctx: &RequestContext,
    ) -> Result<SessionRecord, CoreError> {
        let current = self.storage.get_session(&session.id)?;
        ensure_editable(&current)?;
        let stored = self.payloads.store(&session.description, ctx)?;
        let mut saved = self
            .storage
            .save_session_description(&session.id, stored)?;
        saved.description = session.description.clone();
        Ok(saved)
    }

    /// Replace the draft of an open, current session.
    pub fn update_description(
        &self,
        session_id: &str,
        description: Value,
        ctx: &RequestContext,
    ) -> Result<SessionRecord, CoreError> {
        let mut session = self.storage.get_session(session_id)?;
        ensure_editable(&session)?;
        if !self.validate(&session)? {
            return Err(CoreError::ConcurrencyConflict(format!(
                "session {session_id} is stale or its environment is busy"
            )));
        }
        session.description = description;
        self.save(&session, ctx)
    }

    /// Advisory check whether `session` could be deployed right now.
    ///
    /// False when the environment has moved past the session's version, or
    /// when the session is still open and a sibling is deploying or deleting.
    /// The binding check is repeated atomically when the session is claimed.
    pub fn validate(&self, session: &SessionRecord) -> Result<bool, CoreError> {
        let environment = self.storage.get_environment(&session.environment_id)?;
        if environment.version > session.version {
            return Ok(false);
        }
        if session.state == SessionState::Opened {
            let busy = self
                .storage
                .list_sessions(&session.environment_id, None)?
                .into_iter()
                .any(|s| s.id != session.id && s.state.is_in_flight());
            if busy {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Deploy the session's draft.
    ///
    /// The session is claimed into `DEPLOYING` before the intent is submitted;
    /// an empty topology produces a deletion intent. If submission fails the
    /// session stays claimed and the error is returned.
    pub fn deploy(
        &self,
        session_id: &str,
        ctx: &RequestContext,
    ) -> Result<DeploymentIntent, CoreError> {
        let session = self.get(session_id, ctx)?;
        let intent = intent_for(
            session.environment_id.clone(),
            session.id.clone(),
            &session.description,
        );
        validate_transition(session.state, SessionState::Deploying)?;
        if !self.validate(&session)? {
            return Err(CoreError::ConcurrencyConflict(format!(
                "session {session_id} is not valid for deployment"
            )));
        }

        self.storage
            .claim_session(session_id, SessionState::Deploying)?;

        if let Err(e) = self.submitter.submit(&intent, ctx) {
            error!("session {session_id} is deploying but its intent was not submitted: {e}");
            return Err(e.into());
        }
        info!(
            "submitted {} intent for session {session_id} on environment {}",
            intent.action.as_deref().unwrap_or("delete"),
            intent.environment_id
        );
        Ok(intent)
    }

    /// Remove a session that is not deploying or deleting.
    pub fn delete(&self, session_id: &str) -> Result<(), CoreError> {
        self.storage.remove_session(session_id)?;
        info!("deleted session {session_id}");
        Ok(())
    }

    /// Record the orchestrator's outcome for an in-flight session.
    ///
    /// A successful deployment commits the session's draft as the
    /// environment's new version; a successful deletion removes the
    /// environment. Returns the session in its final state (stored form).
    pub fn finish(
        &self,
        session_id: &str,
        outcome: DeploymentOutcome,
    ) -> Result<SessionRecord, CoreError> {
        let session = self.storage.get_session(session_id)?;
        let target = outcome_target(session.state, outcome);
        validate_transition(session.state, target)?;

        let finished = match target {
            SessionState::Deployed => {
                let (environment, session) = self.storage.complete_deployment(session_id)?;
                info!(
                    "environment {} is now at version {}",
                    environment.id, environment.version
                );
                session
            }
            SessionState::Deleted => self.storage.complete_deletion(session_id)?,
            failed => {
                let session = self
                    .storage
                    .transition_session_state(session_id, session.state, failed)?;
                warn!(
                    "session {session_id} on environment {} ended in {failed}",
                    session.environment_id
                );
                session
            }
        };
        Ok(finished)
    }
}

fn outcome_target(from: SessionState, outcome: DeploymentOutcome) -> SessionState {
    match (from, outcome) {
        (SessionState::Deleting, DeploymentOutcome::Succeeded) => SessionState::Deleted,
        (SessionState::Deleting, DeploymentOutcome::Failed) => SessionState::DeleteFailure,
        (_, DeploymentOutcome::Succeeded) => SessionState::Deployed,
        (_, DeploymentOutcome::Failed) => SessionState::DeployFailure,
    }
}

fn ensure_editable(session: &SessionRecord) -> Result<(), CoreError> {
    if session.state == SessionState::Opened {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: session.state.to_string(),
            to: SessionState::Opened.to_string(),
        })
    }
}

use crate::deployment::DeploymentSubmitter;
use crate::lifecycle::validate_transition;
use crate::payload::{PayloadAdapter, PayloadKind};
use crate::sessions::SessionService;
use crate::status::{derive_status, DescriptionView};
use crate::CoreError;
use serde_json::Value;
use std::sync::Arc;
use strata_schema::{
    Description, DeploymentIntent, EnvId, EnvironmentStatus, RequestContext, SessionId,
    SessionState, TenantId,
};
use strata_store::{EnvironmentRecord, SessionRecord, Storage};
use tracing::{error, info, warn};

/// Environment CRUD, status, description views, and decommissioning.
pub struct EnvironmentService {
    storage: Arc<Storage>,
    payloads: Arc<PayloadAdapter>,
    submitter: Arc<dyn DeploymentSubmitter>,
    sessions: Arc<SessionService>,
}

impl EnvironmentService {
    pub fn new(
        storage: Arc<Storage>,
        payloads: Arc<PayloadAdapter>,
        submitter: Arc<dyn DeploymentSubmitter>,
        sessions: Arc<SessionService>,
    ) -> Self {
        Self {
            storage,
            payloads,
            submitter,
            sessions,
        }
    }

    fn decode(
        &self,
        mut record: EnvironmentRecord,
        ctx: &RequestContext,
    ) -> Result<EnvironmentRecord, CoreError> {
        let stored = std::mem::take(&mut record.description);
        record.description = self
            .payloads
            .load(PayloadKind::Environment, &record.id, stored, ctx)?;
        Ok(record)
    }

    /// Create an environment in the caller's tenant with a seed description.
    pub fn create(&self, name: &str, ctx: &RequestContext) -> Result<EnvironmentRecord, CoreError> {
        let id = EnvId::generate();
        let seed = Description::seed(&id, name).into_value();
        let stored = self.payloads.store(&seed, ctx)?;
        let mut record = EnvironmentRecord::new(id, name, ctx.tenant_id.clone(), stored);
        self.storage.create_environment(&record)?;
        info!("created environment '{name}' ({}) for tenant {}", record.id, record.tenant_id);
        record.description = seed;
        Ok(record)
    }

    pub fn get(&self, env_id: &str, ctx: &RequestContext) -> Result<EnvironmentRecord, CoreError> {
        let record = self.storage.get_environment(env_id)?;
        self.decode(record, ctx)
    }

    /// All environments, optionally of one tenant. Descriptions stay in stored form.
    pub fn list(&self, tenant: Option<&TenantId>) -> Result<Vec<EnvironmentRecord>, CoreError> {
        Ok(match tenant {
            Some(tenant) => self.storage.environments_for_tenant(tenant)?,
            None => self.storage.list_environments()?,
        })
    }

    pub fn rename(&self, env_id: &str, name: &str) -> Result<EnvironmentRecord, CoreError> {
        let record = self.storage.rename_environment(env_id, name)?;
        info!("renamed environment {env_id} to '{name}'");
        Ok(record)
    }

    /// Replace the committed description in place, without a deployment.
    ///
    /// Refused while a session is deploying or deleting, or if the environment
    /// moves to a new version while the payload is being sealed.
    pub fn save(
        &self,
        env_id: &str,
        description: &Value,
        ctx: &RequestContext,
    ) -> Result<EnvironmentRecord, CoreError> {
        let current = self.storage.get_environment(env_id)?;
        let stored = self.payloads.store(description, ctx)?;
        let mut record =
            self.storage
                .replace_environment_description(env_id, current.version, stored)?;
        record.description = description.clone();
        Ok(record)
    }

    /// Status derived from the environment's sessions, most recent first.
    pub fn status(&self, env_id: &str) -> Result<EnvironmentStatus, CoreError> {
        self.storage.get_environment(env_id)?;
        let sessions = self.storage.list_sessions(env_id, None)?;
        Ok(derive_status(&sessions))
    }

    /// The description a client should see.
    ///
    /// With a session: its draft while the session is still deployable and not
    /// yet deployed, the committed description otherwise. A session of another
    /// environment is treated as unknown.
    pub fn description(
        &self,
        env_id: &str,
        session_id: Option<&str>,
        view: DescriptionView,
        ctx: &RequestContext,
    ) -> Result<Value, CoreError> {
        let environment = self.storage.get_environment(env_id)?;
        if let Some(session_id) = session_id {
            let session = self.sessions.get(session_id, ctx)?;
            if session.environment_id != environment.id {
                return Err(CoreError::SessionNotFound(session_id.to_owned()));
            }
            if session.state != SessionState::Deployed && self.sessions.validate(&session)? {
                return Ok(view.apply(session.description));
            }
        }
        let committed = self.decode(environment, ctx)?.description;
        Ok(view.apply(committed))
    }

    /// Decommission an environment.
    ///
    /// The committed deployment is claimed into `DELETING` when it is still
    /// the latest settled session. Otherwise a session whose draft has no
    /// objects is opened and claimed. The environment disappears once the
    /// orchestrator reports success through [`SessionService::finish`].
    pub fn delete(
        &self,
        env_id: &str,
        ctx: &RequestContext,
    ) -> Result<DeploymentIntent, CoreError> {
        let environment = self.get(env_id, ctx)?;
        let session_id = match self.committed_deployment(&environment)? {
            Some(deployed) => {
                validate_transition(deployed.state, SessionState::Deleting)?;
                self.storage
                    .claim_session(&deployed.id, SessionState::Deleting)?;
                deployed.id
            }
            None => self.open_deletion(environment, ctx)?,
        };

        let intent = DeploymentIntent::delete(EnvId::new(env_id), session_id);
        if let Err(e) = self.submitter.submit(&intent, ctx) {
            error!("environment {env_id} is deleting but its intent was not submitted: {e}");
            return Err(e.into());
        }
        info!(
            "submitted deletion of environment {env_id} (session {})",
            intent.session_id
        );
        Ok(intent)
    }

    /// The committed session if it is deployed and no newer session has
    /// settled since.
    fn committed_deployment(
        &self,
        environment: &EnvironmentRecord,
    ) -> Result<Option<SessionRecord>, CoreError> {
        let Some(committed) = environment.committed_session.as_ref() else {
            return Ok(None);
        };
        let latest = self
            .storage
            .list_sessions(&environment.id, None)?
            .into_iter()
            .find(|s| s.state != SessionState::Opened);
        Ok(latest.filter(|s| s.id == *committed && s.state == SessionState::Deployed))
    }

    /// Open a session with an emptied draft and claim it into `DELETING`.
    ///
    /// The draft is sealed before the session exists, and the session is
    /// discarded again if it cannot be claimed.
    fn open_deletion(
        &self,
        environment: EnvironmentRecord,
        ctx: &RequestContext,
    ) -> Result<SessionId, CoreError> {
        let mut draft = Description::new(environment.description);
        draft.set_objects(Value::Null);
        let stored = self.payloads.store(&draft.into_value(), ctx)?;

        let opened = self.sessions.create(&environment.id, &ctx.user_id)?;
        let claimed = if opened.version != environment.version {
            Err(CoreError::ConcurrencyConflict(format!(
                "environment {} moved to version {} during deletion",
                environment.id, opened.version
            )))
        } else {
            self.storage
                .save_session_description(&opened.id, stored)
                .and_then(|_| self.storage.claim_session(&opened.id, SessionState::Deleting))
                .map_err(CoreError::from)
        };
        if let Err(e) = claimed {
            if let Err(cleanup) = self.storage.remove_session(&opened.id) {
                warn!("could not discard session {}: {cleanup}", opened.id);
            }
            return Err(e);
        }
        Ok(opened.id)
    }
}

use crate::types::{EnvId, SessionId, TenantId, UserId};
use serde::{Deserialize, Serialize};

/// Action name carried by intents that provision the draft topology.
pub const DEPLOY_ACTION: &str = "deploy";

/// Caller identity handed through to the secret store and the orchestrator.
///
/// The core never inspects these fields; they are forwarded unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: impl Into<UserId>, tenant_id: impl Into<TenantId>) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            auth_token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_owned());
        self
    }
}

/// A request for the orchestration engine to act on a session's draft.
///
/// `action` is `None` when the draft asks for the environment to be torn down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentIntent {
    pub action: Option<String>,
    pub environment_id: EnvId,
    pub session_id: SessionId,
}

impl DeploymentIntent {
    pub fn deploy(environment_id: EnvId, session_id: SessionId) -> Self {
        Self {
            action: Some(DEPLOY_ACTION.to_owned()),
            environment_id,
            session_id,
        }
    }

    pub fn delete(environment_id: EnvId, session_id: SessionId) -> Self {
        Self {
            action: None,
            environment_id,
            session_id,
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.action.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_intent_has_no_action() {
        let i = DeploymentIntent::delete(EnvId::new("e"), SessionId::new("s"));
        assert!(i.is_deletion());
        let json = serde_json::to_value(&i).unwrap();
        assert!(json["action"].is_null());
    }

    #[test]
    fn deploy_intent_names_action() {
        let i = DeploymentIntent::deploy(EnvId::new("e"), SessionId::new("s"));
        assert_eq!(i.action.as_deref(), Some(DEPLOY_ACTION));
        assert!(!i.is_deletion());
    }

    #[test]
    fn context_token_is_optional_in_json() {
        let ctx = RequestContext::new("alice", "acme");
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(!json.contains("auth_token"));
        let with = ctx.with_token("t0k");
        assert_eq!(with.auth_token.as_deref(), Some("t0k"));
    }
}

use serde_json::Value;
use strata_schema::{EnvironmentStatus, SessionState, OBJECTS_KEY};
use strata_store::SessionRecord;

/// Derive an environment's status from its sessions, most recent first.
///
/// The first in-flight or failed session decides. Opened sessions only mark
/// the environment pending, and the walk stops at the first completed one, so
/// an older failure is hidden by a newer successful deployment.
pub fn derive_status(sessions: &[SessionRecord]) -> EnvironmentStatus {
    let mut pending = false;
    for session in sessions {
        match session.state {
            SessionState::Deploying => return EnvironmentStatus::Deploying,
            SessionState::Deleting => return EnvironmentStatus::Deleting,
            SessionState::DeployFailure => return EnvironmentStatus::DeployFailure,
            SessionState::DeleteFailure => return EnvironmentStatus::DeleteFailure,
            SessionState::Opened => pending = true,
            SessionState::Deployed | SessionState::Deleted => break,
        }
    }
    if pending {
        EnvironmentStatus::Pending
    } else {
        EnvironmentStatus::Ready
    }
}

/// Which part of a description to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescriptionView {
    /// The `Objects` subtree only.
    #[default]
    Inner,
    /// The whole description document.
    Outer,
}

impl DescriptionView {
    pub fn apply(self, description: Value) -> Value {
        match self {
            DescriptionView::Outer => description,
            DescriptionView::Inner => match description {
                Value::Object(mut map) => map.remove(OBJECTS_KEY).unwrap_or(Value::Null),
                _ => Value::Null,
            },
        }
    }
}

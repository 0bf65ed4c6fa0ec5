use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an editing session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Opened,
    Deploying,
    Deployed,
    DeployFailure,
    Deleting,
    Deleted,
    DeleteFailure,
}

impl SessionState {
    pub const ALL: [SessionState; 7] = [
        SessionState::Opened,
        SessionState::Deploying,
        SessionState::Deployed,
        SessionState::DeployFailure,
        SessionState::Deleting,
        SessionState::Deleted,
        SessionState::DeleteFailure,
    ];

    /// Whether an orchestration run is currently driving this session.
    pub fn is_in_flight(self) -> bool {
        matches!(self, SessionState::Deploying | SessionState::Deleting)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Opened => "opened",
            SessionState::Deploying => "deploying",
            SessionState::Deployed => "deployed",
            SessionState::DeployFailure => "deploy_failure",
            SessionState::Deleting => "deleting",
            SessionState::Deleted => "deleted",
            SessionState::DeleteFailure => "delete_failure",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        SessionState::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| format!("unknown session state '{s}'"))
    }
}

/// Externally visible status of an environment, derived from its session history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentStatus {
    Ready,
    Pending,
    Deploying,
    DeployFailure,
    Deleting,
    DeleteFailure,
}

impl fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentStatus::Ready => write!(f, "ready"),
            EnvironmentStatus::Pending => write!(f, "pending"),
            EnvironmentStatus::Deploying => write!(f, "deploying"),
            EnvironmentStatus::DeployFailure => write!(f, "deploy_failure"),
            EnvironmentStatus::Deleting => write!(f, "deleting"),
            EnvironmentStatus::DeleteFailure => write!(f, "delete_failure"),
        }
    }
}

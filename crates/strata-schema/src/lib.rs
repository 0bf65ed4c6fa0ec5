//! Identifiers, description payloads, lifecycle states, and deployment intents for Strata.
//!
//! This crate defines the vocabulary shared by the store and the core: typed
//! string identifiers (`EnvId`, `SessionId`, ...), the plaintext topology
//! `Description`, the session lifecycle `SessionState` and derived
//! `EnvironmentStatus`, and the `DeploymentIntent` handed to an orchestrator
//! together with the caller's `RequestContext`.

pub mod description;
pub mod intent;
pub mod state;
pub mod types;

pub use description::{Description, OBJECTS_KEY};
pub use intent::{DeploymentIntent, RequestContext, DEPLOY_ACTION};
pub use state::{EnvironmentStatus, SessionState};
pub use types::{EnvId, SessionId, TaskId, TenantId, UserId};

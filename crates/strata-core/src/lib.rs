//! Core session and environment logic for Strata.
//!
//! This crate ties the store and schema together into the `Engine`: the
//! `SessionService` (open, edit, validate, deploy, finish), the
//! `EnvironmentService` (CRUD, status derivation, description views,
//! decommissioning), the `PayloadAdapter` that transparently seals description
//! payloads through a `SecretStore`, and the `DeploymentSubmitter` boundary that
//! hands intents to an orchestrator. It also owns the session lifecycle table
//! and the `StrataConfig` file.

pub mod config;
pub mod deployment;
pub mod engine;
pub mod environments;
pub mod lifecycle;
pub mod payload;
pub mod sessions;
pub mod status;

pub use config::StrataConfig;
pub use deployment::{intent_for, DeploymentOutcome, DeploymentSubmitter, SubmissionError};
pub use engine::Engine;
pub use environments::EnvironmentService;
pub use lifecycle::validate_transition;
pub use payload::{looks_like_reference, PayloadAdapter, PayloadKind, SecretStore, SecretStoreError};
pub use sessions::SessionService;
pub use status::{derive_status, DescriptionView};

use strata_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("environment not found: {0}")]
    EnvNotFound(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),
    #[error("{kind} '{id}' holds an encrypted payload but encrypt_data is disabled")]
    PayloadDecryptionPolicy { kind: PayloadKind, id: String },
    #[error("secret store error: {0}")]
    SecretStore(#[from] SecretStoreError),
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EnvNotFound(id) => CoreError::EnvNotFound(id),
            StoreError::SessionNotFound(id) => CoreError::SessionNotFound(id),
            e if e.is_conflict() => CoreError::ConcurrencyConflict(e.to_string()),
            e => CoreError::Store(e),
        }
    }
}

impl CoreError {
    /// Whether the caller should re-open a session and try again.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::ConcurrencyConflict(_))
    }
}

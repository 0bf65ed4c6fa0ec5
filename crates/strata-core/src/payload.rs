use crate::CoreError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use strata_schema::RequestContext;
use strata_store::{SecretVault, StoreError};
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("secret not found: {0}")]
    NotFound(String),
    #[error("secret store unavailable: {0}")]
    Backend(String),
}

/// Opaque storage for sealed payloads, addressed by reference token.
///
/// The request context is forwarded untouched so that remote implementations
/// can authenticate on the caller's behalf.
pub trait SecretStore: Send + Sync {
    fn store(&self, ctx: &RequestContext, secret: &[u8]) -> Result<String, SecretStoreError>;
    fn resolve(&self, ctx: &RequestContext, token: &str) -> Result<Vec<u8>, SecretStoreError>;
}

impl SecretStore for SecretVault {
    fn store(&self, _ctx: &RequestContext, secret: &[u8]) -> Result<String, SecretStoreError> {
        self.put(secret)
            .map_err(|e| SecretStoreError::Backend(e.to_string()))
    }

    fn resolve(&self, _ctx: &RequestContext, token: &str) -> Result<Vec<u8>, SecretStoreError> {
        self.get(token).map_err(|e| match e {
            StoreError::SecretNotFound(t) => SecretStoreError::NotFound(t),
            e => SecretStoreError::Backend(e.to_string()),
        })
    }
}

/// Which record a payload belongs to, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Environment,
    Session,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Environment => f.write_str("environment"),
            PayloadKind::Session => f.write_str("session"),
        }
    }
}

/// Whether a stored payload is a secret reference rather than plaintext.
///
/// A reference is a bare JSON string that parses as a UUID. A plaintext
/// description that happens to be such a string is indistinguishable.
pub fn looks_like_reference(stored: &Value) -> bool {
    stored.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok())
}

/// Translates between plaintext description payloads and their stored form.
pub struct PayloadAdapter {
    encrypt_data: bool,
    secrets: Arc<dyn SecretStore>,
}

impl PayloadAdapter {
    pub fn new(encrypt_data: bool, secrets: Arc<dyn SecretStore>) -> Self {
        Self {
            encrypt_data,
            secrets,
        }
    }

    pub fn encrypt_data(&self) -> bool {
        self.encrypt_data
    }

    /// Turn a stored payload back into plaintext.
    pub fn load(
        &self,
        kind: PayloadKind,
        id: &str,
        stored: Value,
        ctx: &RequestContext,
    ) -> Result<Value, CoreError> {
        let is_reference = looks_like_reference(&stored);
        match (self.encrypt_data, is_reference) {
            (false, true) => {
                error!("{kind} '{id}' holds an encrypted payload but encrypt_data is disabled");
                Err(CoreError::PayloadDecryptionPolicy {
                    kind,
                    id: id.to_owned(),
                })
            }
            (true, false) => {
                warn!("encrypt_data is enabled, but {kind} with id '{id}' looks to be unencrypted");
                Ok(stored)
            }
            (true, true) => {
                let token = stored.as_str().unwrap_or_default();
                let bytes = self.secrets.resolve(ctx, token).map_err(|e| {
                    error!("failed to resolve payload of {kind} '{id}': {e}");
                    CoreError::SecretStore(e)
                })?;
                debug!("resolved payload of {kind} '{id}'");
                Ok(serde_json::from_slice(&bytes)?)
            }
            (false, false) => Ok(stored),
        }
    }

    /// Turn a plaintext payload into its stored form.
    pub fn store(&self, payload: &Value, ctx: &RequestContext) -> Result<Value, CoreError> {
        if !self.encrypt_data {
            return Ok(payload.clone());
        }
        let bytes = serde_json::to_vec(payload)?;
        let token = self.secrets.store(ctx, &bytes).map_err(|e| {
            error!("failed to seal payload: {e}");
            CoreError::SecretStore(e)
        })?;
        Ok(Value::String(token))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemorySecrets;
    use super::*;
    use serde_json::json;

    fn adapter(encrypt: bool) -> (Arc<MemorySecrets>, PayloadAdapter) {
        let secrets = Arc::new(MemorySecrets::default());
        let adapter = PayloadAdapter::new(encrypt, secrets.clone());
        (secrets, adapter)
    }

    fn ctx() -> RequestContext {
        RequestContext::new("alice", "acme")
    }

    #[test]
    fn reference_heuristic() {
        assert!(looks_like_reference(&json!(
            "0b6c1f52-3c4e-4a8e-9f3b-2d7a5e1c9b40"
        )));
        assert!(!looks_like_reference(&json!("not-a-token")));
        assert!(!looks_like_reference(&json!({ "Objects": {} })));
        assert!(!looks_like_reference(&Value::Null));
    }

    #[test]
    fn store_then_load_round_trips_with_encryption() {
        let (secrets, adapter) = adapter(true);
        let payload = json!({ "Objects": { "name": "web" }, "Attributes": [] });

        let stored = adapter.store(&payload, &ctx()).unwrap();
        assert!(looks_like_reference(&stored));
        let loaded = adapter
            .load(PayloadKind::Session, "s1", stored, &ctx())
            .unwrap();

        assert_eq!(loaded, payload);
        assert_eq!(secrets.calls(), 2);
    }

    #[test]
    fn plaintext_passes_through_without_encryption() {
        let (secrets, adapter) = adapter(false);
        let payload = json!({ "Objects": null });
        let stored = adapter.store(&payload, &ctx()).unwrap();
        assert_eq!(stored, payload);
        assert_eq!(
            adapter
                .load(PayloadKind::Environment, "e1", stored, &ctx())
                .unwrap(),
            payload
        );
        assert_eq!(secrets.calls(), 0);
    }

    #[test]
    fn reference_with_encryption_disabled_is_policy_error() {
        let (secrets, adapter) = adapter(false);
        let err = adapter
            .load(
                PayloadKind::Environment,
                "e1",
                json!(Uuid::new_v4().to_string()),
                &ctx(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::PayloadDecryptionPolicy {
                kind: PayloadKind::Environment,
                ..
            }
        ));
        assert_eq!(secrets.calls(), 0);
    }

    #[test]
    fn legacy_plaintext_is_returned_when_encryption_enabled() {
        let (secrets, adapter) = adapter(true);
        let legacy = json!({ "Objects": { "name": "old" } });
        let loaded = adapter
            .load(PayloadKind::Session, "s1", legacy.clone(), &ctx())
            .unwrap();
        assert_eq!(loaded, legacy);
        assert_eq!(secrets.calls(), 0);
    }

    #[test]
    fn secret_store_failure_surfaces() {
        let (secrets, adapter) = adapter(true);
        secrets.fail();
        assert!(matches!(
            adapter.store(&json!({}), &ctx()),
            Err(CoreError::SecretStore(_))
        ));
        assert!(matches!(
            adapter.load(
                PayloadKind::Session,
                "s1",
                json!(Uuid::new_v4().to_string()),
                &ctx()
            ),
            Err(CoreError::SecretStore(_))
        ));
    }

    #[test]
    fn vault_backed_adapter_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let layout = strata_store::StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        let vault = Arc::new(SecretVault::open(&layout).unwrap());
        let adapter = PayloadAdapter::new(true, vault);

        let payload = json!({ "Objects": { "?": { "id": "e1" } } });
        let stored = adapter.store(&payload, &ctx()).unwrap();
        let loaded = adapter
            .load(PayloadKind::Environment, "e1", stored, &ctx())
            .unwrap();
        assert_eq!(loaded, payload);
    }
}

use crate::layout::StoreLayout;
use crate::{fsync_dir, write_atomic, StoreError};
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::{Key, KeyInit, XChaCha20Poly1305, XNonce};
use rand_core::{OsRng, RngCore};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;

/// Local secret store for description payloads.
///
/// Each payload is sealed with XChaCha20-Poly1305 under a store-wide key and
/// written to `secrets/<token>`. The token is a hyphenated UUID and doubles as
/// associated data, so a sealed blob cannot be replayed under another token.
pub struct SecretVault {
    dir: PathBuf,
    key: [u8; KEY_LEN],
}

impl SecretVault {
    /// Open the vault, generating the store key on first use.
    pub fn open(layout: &StoreLayout) -> Result<Self, StoreError> {
        let key = load_or_create_key(layout)?;
        Ok(Self {
            dir: layout.secrets_dir(),
            key,
        })
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(&Key::from(self.key))
    }

    fn path_for(&self, token: &str) -> Result<PathBuf, StoreError> {
        // Only canonical tokens map to files; anything else cannot name a secret.
        let parsed =
            Uuid::parse_str(token).map_err(|_| StoreError::SecretNotFound(token.to_owned()))?;
        Ok(self.dir.join(parsed.hyphenated().to_string()))
    }

    /// Seal `plaintext` and return the reference token.
    pub fn put(&self, plaintext: &[u8]) -> Result<String, StoreError> {
        let token = Uuid::new_v4().hyphenated().to_string();

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let sealed = self
            .cipher()
            .encrypt(
                &XNonce::from(nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: token.as_bytes(),
                },
            )
            .map_err(|_| StoreError::Vault("encryption failed".to_owned()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&sealed);
        write_atomic(&self.dir, &self.path_for(&token)?, &blob)?;
        debug!("sealed secret {token} ({} bytes)", plaintext.len());
        Ok(token)
    }

    /// Open the secret named by `token`.
    pub fn get(&self, token: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(token)?;
        if !path.exists() {
            return Err(StoreError::SecretNotFound(token.to_owned()));
        }
        let blob = fs::read(&path)?;
        if blob.len() < NONCE_LEN {
            return Err(StoreError::Vault(format!("secret {token} is truncated")));
        }
        let (nonce, sealed) = blob.split_at(NONCE_LEN);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce);
        self.cipher()
            .decrypt(
                &XNonce::from(nonce_bytes),
                Payload {
                    msg: sealed,
                    aad: token.as_bytes(),
                },
            )
            .map_err(|_| StoreError::Vault(format!("secret {token} failed authentication")))
    }
}

fn load_or_create_key(layout: &StoreLayout) -> Result<[u8; KEY_LEN], StoreError> {
    let path = layout.vault_key_file();
    if !path.exists() {
        let dir = layout.store_dir();
        fs::create_dir_all(&dir)?;
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&key)?;
        tmp.as_file().sync_all()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        // Another process may have created the key meanwhile; theirs wins.
        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                fsync_dir(&dir)?;
                info!("generated vault key at {}", path.display());
                return Ok(key);
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(StoreError::Io(e.error)),
        }
    }

    let bytes = fs::read(&path)?;
    bytes.as_slice().try_into().map_err(|_| {
        StoreError::Vault(format!(
            "vault key {} must be {KEY_LEN} bytes, found {}",
            path.display(),
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, StoreLayout, SecretVault) {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        let vault = SecretVault::open(&layout).unwrap();
        (dir, layout, vault)
    }

    #[test]
    fn put_then_get_returns_plaintext() {
        let (_dir, _layout, vault) = setup();
        let token = vault.put(br#"{"name":"web"}"#).unwrap();
        assert!(Uuid::parse_str(&token).is_ok());
        assert_eq!(vault.get(&token).unwrap(), br#"{"name":"web"}"#);
    }

    #[test]
    fn secret_files_do_not_contain_plaintext() {
        let (_dir, layout, vault) = setup();
        let token = vault.put(b"very-secret-value").unwrap();
        let raw = fs::read(layout.secrets_dir().join(&token)).unwrap();
        assert!(!raw
            .windows(b"very-secret-value".len())
            .any(|w| w == b"very-secret-value"));
    }

    #[test]
    fn key_survives_reopen() {
        let (_dir, layout, vault) = setup();
        let token = vault.put(b"payload").unwrap();
        let reopened = SecretVault::open(&layout).unwrap();
        assert_eq!(reopened.get(&token).unwrap(), b"payload");
    }

    #[test]
    fn unknown_or_malformed_tokens_are_not_found() {
        let (_dir, _layout, vault) = setup();
        assert!(matches!(
            vault.get(&Uuid::new_v4().to_string()),
            Err(StoreError::SecretNotFound(_))
        ));
        assert!(matches!(
            vault.get("../vault.key"),
            Err(StoreError::SecretNotFound(_))
        ));
    }

    #[test]
    fn blob_moved_to_other_token_fails_authentication() {
        let (_dir, layout, vault) = setup();
        let a = vault.put(b"first").unwrap();
        let b = vault.put(b"second").unwrap();
        fs::copy(
            layout.secrets_dir().join(&a),
            layout.secrets_dir().join(&b),
        )
        .unwrap();
        assert!(matches!(vault.get(&b), Err(StoreError::Vault(_))));
    }

    #[test]
    fn wrong_size_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        fs::write(layout.vault_key_file(), b"short").unwrap();
        assert!(matches!(
            SecretVault::open(&layout),
            Err(StoreError::Vault(_))
        ));
    }
}

use super::draft_key::DraftKey;
use crate::application::ports::draft_store::DraftStore;
use crate::shared::error::AppError;
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use tracing::warn;

const NONCE_SIZE: usize = 12;

/// Wraps another store and seals every value with AES-256-GCM.
///
/// Values are stored as base64 of `nonce || ciphertext`. A value that fails to
/// decode or authenticate reads as absent, the same as a corrupted blob.
pub struct EncryptedDraftStore<S> {
    inner: S,
    cipher: Aes256Gcm,
}

impl<S: DraftStore> EncryptedDraftStore<S> {
    pub fn new(inner: S, key: &DraftKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            inner,
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn seal(&self, plaintext: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self.cipher.encrypt(&nonce, plaintext.as_bytes())?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&combined))
    }

    fn open(&self, sealed: &str) -> Result<String, AppError> {
        let combined = general_purpose::STANDARD.decode(sealed)?;
        if combined.len() < NONCE_SIZE {
            return Err(AppError::Crypto("Sealed draft is too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = self.cipher.decrypt(nonce, ciphertext)?;
        String::from_utf8(plaintext)
            .map_err(|e| AppError::Crypto(format!("Decrypted draft is not UTF-8: {e}")))
    }
}

#[async_trait]
impl<S: DraftStore> DraftStore for EncryptedDraftStore<S> {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        let Some(sealed) = self.inner.get_raw(key).await? else {
            return Ok(None);
        };
        match self.open(&sealed) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(err) => {
                warn!(target: "storage::crypto", key, error = %err, "unreadable sealed draft");
                Ok(None)
            }
        }
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), AppError> {
        let sealed = self.seal(value)?;
        self.inner.set_raw(key, &sealed).await
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.inner.remove(key).await
    }
}

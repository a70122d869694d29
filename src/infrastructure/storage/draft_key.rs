use crate::shared::error::AppError;
use base64::{Engine as _, engine::general_purpose};
use keyring::Entry;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::info;

const KEY_ENTRY: &str = "draft_encryption_key";
pub const KEY_SIZE: usize = 32;

/// AES-256 key protecting draft blobs at rest.
#[derive(Clone)]
pub struct DraftKey([u8; KEY_SIZE]);

impl DraftKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Reads the key from the OS keyring, creating and storing one on first use.
    pub fn load_or_create(service: &str) -> Result<Self, AppError> {
        let entry = Entry::new(service, KEY_ENTRY)?;
        match entry.get_password() {
            Ok(encoded) => Self::decode(&encoded),
            Err(keyring::Error::NoEntry) => {
                let key = Self::generate();
                entry.set_password(&key.encode())?;
                info!(target: "storage::crypto", service, "created draft encryption key");
                Ok(key)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    fn encode(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    fn decode(encoded: &str) -> Result<Self, AppError> {
        let bytes = general_purpose::STANDARD.decode(encoded)?;
        let bytes: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| AppError::Crypto("Stored draft key has the wrong length".to_string()))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for DraftKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DraftKey(..)")
    }
}

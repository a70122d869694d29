use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub outbox: OutboxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Seal draft blobs with a key kept in the OS keyring.
    pub encrypt_drafts: bool,
    pub keyring_service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxConfig {
    pub chat_storage_key: String,
    pub note_storage_key: String,
    pub note_debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            database: DatabaseConfig {
                url: format!("sqlite:{}?mode=rwc", data_dir.join("drafts.db").display()),
                max_connections: 5,
            },
            storage: StorageConfig {
                data_dir: data_dir.display().to_string(),
                encrypt_drafts: true,
                keyring_service: "drive-outbox".to_string(),
            },
            outbox: OutboxConfig::default(),
        }
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            chat_storage_key: "chatMessagesOutbox".to_string(),
            note_storage_key: "noteContentOutbox".to_string(),
            note_debounce_ms: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("DRIVE_OUTBOX_DATA_DIR") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.storage.data_dir = trimmed.to_string();
                cfg.database.url = format!(
                    "sqlite:{}?mode=rwc",
                    PathBuf::from(trimmed).join("drafts.db").display()
                );
            }
        }
        // An explicit URL wins over the one derived from the data dir.
        if let Ok(v) = std::env::var("DRIVE_OUTBOX_DATABASE_URL")
            && !v.trim().is_empty()
        {
            cfg.database.url = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("DRIVE_OUTBOX_MAX_CONNECTIONS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.database.max_connections = value.min(u32::MAX as u64) as u32;
        }
        if let Ok(v) = std::env::var("DRIVE_OUTBOX_ENCRYPT_DRAFTS") {
            cfg.storage.encrypt_drafts = parse_bool(&v, cfg.storage.encrypt_drafts);
        }
        if let Ok(v) = std::env::var("DRIVE_OUTBOX_KEYRING_SERVICE")
            && !v.trim().is_empty()
        {
            cfg.storage.keyring_service = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("DRIVE_OUTBOX_NOTE_DEBOUNCE_MS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.outbox.note_debounce_ms = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.outbox.chat_storage_key.trim().is_empty()
            || self.outbox.note_storage_key.trim().is_empty()
        {
            return Err("Outbox storage keys must not be empty".to_string());
        }
        if self.outbox.chat_storage_key == self.outbox.note_storage_key {
            return Err("Chat and note outboxes must use distinct storage keys".to_string());
        }
        if self.outbox.note_debounce_ms == 0 {
            return Err("Outbox note_debounce_ms must be greater than 0".to_string());
        }
        if self.storage.encrypt_drafts && self.storage.keyring_service.trim().is_empty() {
            return Err("Storage keyring_service is required when encrypt_drafts is on".to_string());
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("drive-outbox");
    path
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

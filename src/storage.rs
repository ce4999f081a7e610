use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{debug, error};

/// Synchronous string key-value store the habit state is written through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store, flushed to disk as one JSON object of key -> string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

pub async fn load_store(path: &Path) -> MemoryStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(store) => store,
            Err(err) => {
                error!("failed to parse store file {}: {err}", path.display());
                MemoryStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no store file at {}, starting empty", path.display());
            MemoryStore::default()
        }
        Err(err) => {
            error!("failed to read store file {}: {err}", path.display());
            MemoryStore::default()
        }
    }
}

/// Writes the store next to `path` and renames it into place, so a crash
/// mid-write leaves the previous file intact.
pub async fn persist_store(path: &Path, store: &MemoryStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store)?;
    let staging = staging_path(path);
    fs::write(&staging, payload).await?;
    if let Err(err) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

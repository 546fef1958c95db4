use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage key for the durable block set (array of URL strings).
pub const KEY_BLOCKLIST: &str = "suspicious_cache";
/// Storage key for the last scan's counters.
pub const KEY_SCAN_STATS: &str = "scan_stats";
/// Storage key for the scan options record.
pub const KEY_OPTIONS: &str = "options";
/// Storage key for the extension-wide enabled flag.
pub const KEY_ENABLED: &str = "enabled";

/// Asynchronous key-value store shared across all scanning contexts.
///
/// File-backed in normal operation (a single JSON object on disk, flushed on
/// every write), or purely in-memory for tests. Each key is independently
/// owned by one writer, so no transactions are needed.
#[derive(Debug, Clone)]
pub struct Storage {
    path: Option<PathBuf>,
    entries: Arc<RwLock<HashMap<String, Value>>>,
    fail_writes: bool,
}

impl Storage {
    /// Open a file-backed store, loading any existing state. A missing file
    /// starts empty; the parent directory is created if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            entries: Arc::new(RwLock::new(entries)),
            fail_writes: false,
        })
    }

    /// In-memory store with no persistence. Used by tests and as a degraded
    /// fallback when the state file cannot be opened.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Arc::new(RwLock::new(HashMap::new())),
            fail_writes: false,
        }
    }

    /// In-memory store whose writes always fail. Reads still work; used to
    /// exercise the degraded persistence paths.
    pub fn with_failing_writes() -> Self {
        Self {
            path: None,
            entries: Arc::new(RwLock::new(HashMap::new())),
            fail_writes: true,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(self.write_failure());
        }
        let encoded = serde_json::to_value(value)?;
        {
            let mut entries = self.entries.write().await;
            entries.insert(key.to_string(), encoded);
        }
        self.flush().await
    }

    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(self.write_failure());
        }
        {
            let mut entries = self.entries.write().await;
            entries.remove(key);
        }
        self.flush().await
    }

    fn write_failure(&self) -> StorageError {
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "simulated write failure",
        ))
    }

    async fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = {
            let entries = self.entries.read().await;
            serde_json::to_string_pretty(&*entries)?
        };
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_state_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "linkshield-test-{tag}-{}.json",
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn test_get_set_remove() {
        let store = Storage::in_memory();

        assert_eq!(store.get::<bool>(KEY_ENABLED).await.unwrap(), None);
        store.set(KEY_ENABLED, &true).await.unwrap();
        assert_eq!(store.get::<bool>(KEY_ENABLED).await.unwrap(), Some(true));
        store.remove(KEY_ENABLED).await.unwrap();
        assert_eq!(store.get::<bool>(KEY_ENABLED).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let path = temp_state_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let urls = vec![
            "http://bad.example/login".to_string(),
            "http://worse.example/verify".to_string(),
        ];
        {
            let store = Storage::open(&path).await.unwrap();
            store.set(KEY_BLOCKLIST, &urls).await.unwrap();
        }

        // Reopen and confirm membership survives, independent of order
        let store = Storage::open(&path).await.unwrap();
        let loaded: Vec<String> = store.get(KEY_BLOCKLIST).await.unwrap().unwrap();
        assert_eq!(loaded.len(), urls.len());
        for url in &urls {
            assert!(loaded.contains(url));
        }

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_failing_writes_surface_errors() {
        let store = Storage::with_failing_writes();
        assert!(store.set(KEY_ENABLED, &true).await.is_err());
        assert!(store.remove(KEY_ENABLED).await.is_err());
        // A failed write leaves nothing behind, and reads keep working
        assert_eq!(store.get::<bool>(KEY_ENABLED).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let path = temp_state_path("missing");
        let _ = std::fs::remove_file(&path);

        let store = Storage::open(&path).await.unwrap();
        let loaded: Option<Vec<String>> = store.get(KEY_BLOCKLIST).await.unwrap();
        assert!(loaded.is_none());

        let _ = std::fs::remove_file(&path);
    }
}

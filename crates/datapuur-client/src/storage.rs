//! Persistent key/value client storage.
//!
//! Plays the role browser local storage plays for the web console: a flat
//! map of string keys to JSON values, kept in memory and written through to
//! a single JSON file.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::{ClientError, ClientResult};

/// Key holding the job list snapshot.
pub const JOBS_SNAPSHOT_KEY: &str = "processingJobs";
/// Key holding the sidebar collapsed flag.
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";
/// Key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "token";
/// Key holding the transformation currently open in the editor.
pub const CURRENT_TRANSFORMATION_KEY: &str = "currentTransformationId";

/// JSON file-backed key/value store.
pub struct ClientStorage {
    /// Backing file; `None` keeps everything in memory.
    path: Option<PathBuf>,

    entries: RwLock<FxHashMap<String, serde_json::Value>>,
}

impl ClientStorage {
    /// Open (or create) storage backed by `path`.
    ///
    /// A corrupt file is logged and replaced by an empty map on the next write.
    pub async fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let entries = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Discarding unreadable client storage {:?}: {}", path, e);
                    FxHashMap::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FxHashMap::default(),
            Err(e) => return Err(ClientError::Io(e)),
        };

        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    /// Storage that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.read().await.get(key).cloned()
    }

    /// Read and decode a value. Undecodable values read as absent.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring malformed client storage entry '{}': {}", key, e);
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: serde_json::Value) -> ClientResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        self.flush(&entries).await
    }

    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T) -> ClientResult<()> {
        self.set(key, serde_json::to_value(value)?).await
    }

    /// Remove a key. Returns whether it was present.
    pub async fn remove(&self, key: &str) -> ClientResult<bool> {
        let mut entries = self.entries.write().await;
        let was_present = entries.remove(key).is_some();
        if was_present {
            self.flush(&entries).await?;
        }
        Ok(was_present)
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn sidebar_collapsed(&self) -> bool {
        self.get_as(SIDEBAR_COLLAPSED_KEY).await.unwrap_or(false)
    }

    pub async fn set_sidebar_collapsed(&self, collapsed: bool) -> ClientResult<()> {
        self.set_as(SIDEBAR_COLLAPSED_KEY, &collapsed).await
    }

    pub async fn auth_token(&self) -> Option<String> {
        self.get_as::<String>(AUTH_TOKEN_KEY)
            .await
            .filter(|t| !t.is_empty())
    }

    pub async fn set_auth_token(&self, token: Option<&str>) -> ClientResult<()> {
        match token {
            Some(token) => self.set_as(AUTH_TOKEN_KEY, &token).await,
            None => self.remove(AUTH_TOKEN_KEY).await.map(|_| ()),
        }
    }

    pub async fn current_transformation_id(&self) -> Option<String> {
        self.get_as(CURRENT_TRANSFORMATION_KEY).await
    }

    pub async fn set_current_transformation_id(&self, id: Option<&str>) -> ClientResult<()> {
        match id {
            Some(id) => self.set_as(CURRENT_TRANSFORMATION_KEY, &id).await,
            None => self.remove(CURRENT_TRANSFORMATION_KEY).await.map(|_| ()),
        }
    }

    // Called with the write lock held so concurrent writers cannot reorder files.
    async fn flush(&self, entries: &FxHashMap<String, serde_json::Value>) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ClientStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientStorage")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_basic() {
        let storage = ClientStorage::in_memory();
        assert!(storage.get("missing").await.is_none());

        storage.set("a", json!({"x": 1})).await.unwrap();
        assert_eq!(storage.get("a").await, Some(json!({"x": 1})));

        assert!(storage.remove("a").await.unwrap());
        assert!(!storage.remove("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backed_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("storage.json");

        let storage = ClientStorage::open(&path).await.unwrap();
        storage.set_sidebar_collapsed(true).await.unwrap();
        storage.set_auth_token(Some("abc")).await.unwrap();
        storage
            .set_current_transformation_id(Some("tr-9"))
            .await
            .unwrap();
        drop(storage);

        let reopened = ClientStorage::open(&path).await.unwrap();
        assert!(reopened.sidebar_collapsed().await);
        assert_eq!(reopened.auth_token().await.as_deref(), Some("abc"));
        assert_eq!(
            reopened.current_transformation_id().await.as_deref(),
            Some("tr-9")
        );
        assert_eq!(
            reopened.keys().await,
            vec![
                AUTH_TOKEN_KEY.to_string(),
                CURRENT_TRANSFORMATION_KEY.to_string(),
                SIDEBAR_COLLAPSED_KEY.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let storage = ClientStorage::open(&path).await.unwrap();
        assert!(storage.keys().await.is_empty());
        assert!(!storage.sidebar_collapsed().await);
    }

    #[tokio::test]
    async fn test_clearing_token() {
        let storage = ClientStorage::in_memory();
        storage.set_auth_token(Some("t")).await.unwrap();
        storage.set_auth_token(None).await.unwrap();
        assert!(storage.auth_token().await.is_none());

        storage.set_as(AUTH_TOKEN_KEY, &"").await.unwrap();
        assert!(storage.auth_token().await.is_none());
    }
}

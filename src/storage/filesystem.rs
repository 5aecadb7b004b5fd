//! File System Transcript Storage
//!
//! Information Hiding:
//! - File path and JSON serialization format hidden from users
//! - Pretty-printed JSON array so the file stays hand-inspectable
//! - Unreadable or corrupt files degrade to a `Malformed` load outcome

use super::{Loaded, StoreError, TranscriptStore};
use crate::history::Turn;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Single-file storage - the whole transcript is one JSON array
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl TranscriptStore for JsonFileStore {
    async fn save(&self, turns: &[Turn]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(turns)?;
        fs::write(&self.path, json).await?;

        tracing::debug!(
            "[JsonFileStore] Saved {} turns to {:?}",
            turns.len(),
            self.path
        );
        Ok(())
    }

    async fn load(&self) -> Loaded {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("[JsonFileStore] No transcript at {:?}", self.path);
                return Loaded::Missing;
            }
            Err(e) => {
                tracing::warn!("[JsonFileStore] Could not read {:?}: {}", self.path, e);
                return Loaded::Malformed;
            }
        };

        match serde_json::from_str::<Vec<Turn>>(&json) {
            Ok(turns) => {
                tracing::debug!(
                    "[JsonFileStore] Loaded {} turns from {:?}",
                    turns.len(),
                    self.path
                );
                Loaded::Turns(turns)
            }
            Err(e) => {
                tracing::warn!("[JsonFileStore] Could not decode {:?}: {}", self.path, e);
                Loaded::Malformed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Role;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("history.json"))
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let turns = vec![
            Turn::new(Role::User, "Hello"),
            Turn::new(Role::Assistant, "Hi there"),
        ];

        store.save(&turns).await.unwrap();
        match store.load().await {
            Loaded::Turns(loaded) => {
                assert_eq!(loaded.len(), 2);
                assert_eq!(loaded[0].content, "Hello");
                assert_eq!(loaded[1].role, Role::Assistant);
            }
            other => panic!("expected turns, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        assert!(matches!(store.load().await, Loaded::Missing));
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.json");
        std::fs::write(&path, "{ not json at all").unwrap();

        let store = JsonFileStore::new(path);
        assert!(matches!(store.load().await, Loaded::Malformed));
    }

    #[tokio::test]
    async fn test_save_writes_pretty_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store
            .save(&[Turn::new(Role::User, "ping")])
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains("\"role\": \"user\""));
        assert!(raw.contains("\"content\": \"ping\""));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store
            .save(&[
                Turn::new(Role::User, "first"),
                Turn::new(Role::Assistant, "second"),
            ])
            .await
            .unwrap();
        store.save(&[Turn::new(Role::User, "only")]).await.unwrap();

        match store.load().await {
            Loaded::Turns(loaded) => {
                assert_eq!(loaded.len(), 1);
                assert_eq!(loaded[0].content, "only");
            }
            other => panic!("expected turns, got {:?}", other),
        }
    }
}

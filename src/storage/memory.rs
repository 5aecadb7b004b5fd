//! In-Memory Transcript Storage
//!
//! Information Hiding:
//! - Mutex-guarded buffer hidden behind the async interface
//! - Suitable for tests and ephemeral sessions; data is lost on exit

use super::{Loaded, StoreError, TranscriptStore};
use crate::history::Turn;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// In-memory storage, starts out with no persisted state
pub struct InMemoryStore {
    turns: Mutex<Option<Vec<Turn>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            turns: Mutex::new(None),
        }
    }

    /// Pre-seed persisted state, as if a previous session had saved it
    pub fn with_turns(turns: Vec<Turn>) -> Self {
        Self {
            turns: Mutex::new(Some(turns)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryStore {
    async fn save(&self, turns: &[Turn]) -> Result<(), StoreError> {
        let mut guard = self.turns.lock().await;
        *guard = Some(turns.to_vec());
        tracing::debug!("[InMemoryStore] Saved {} turns", turns.len());
        Ok(())
    }

    async fn load(&self) -> Loaded {
        let guard = self.turns.lock().await;
        match guard.as_ref() {
            Some(turns) => Loaded::Turns(turns.clone()),
            None => Loaded::Missing,
        }
    }
}

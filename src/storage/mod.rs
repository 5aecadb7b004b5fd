//! Transcript Storage Abstraction
//!
//! Information Hiding:
//! - Storage backend implementation details hidden behind trait
//! - Allows swapping between memory and filesystem without API changes
//! - Corrupt or missing persisted state is a classified load outcome,
//!   never an error that escapes the load boundary

use crate::history::Turn;
use async_trait::async_trait;
use thiserror::Error;

pub mod filesystem;
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write transcript: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of reading persisted state back in.
///
/// Missing and malformed content are ordinary outcomes: the caller starts
/// from an empty transcript and, for `Malformed`, warns the user.
#[derive(Debug)]
pub enum Loaded {
    Missing,
    Turns(Vec<Turn>),
    Malformed,
}

/// Trait defining transcript persistence
/// Implementations rewrite the whole transcript on every save
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Persist the full transcript, replacing any previous state
    async fn save(&self, turns: &[Turn]) -> Result<(), StoreError>;

    /// Read the persisted transcript back in
    async fn load(&self) -> Loaded;
}

//! Bounded Conversation History
//!
//! Information Hiding:
//! - Eviction and truncation policy hidden behind push/clear/snapshot
//! - Persistence backend reached only through the `TranscriptStore` trait
//! - Every mutation rewrites the whole transcript (write-through)

use crate::storage::{Loaded, StoreError, TranscriptStore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn. Serialized lowercase to match the transcript file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One conversational message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// What `History::open` found on disk, for the caller to surface.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Original length of the persisted transcript, when it exceeded the cap
    pub truncated_from: Option<usize>,
    /// Persisted content was unreadable or not valid JSON
    pub malformed: bool,
}

/// Ordered log of turns, capped at `max_turns` after every mutation.
///
/// When a push would exceed the cap, exactly the single oldest turn is
/// evicted. Turns arrive in user/assistant pairs, so sustained use leaves
/// the log starting mid-pair; that is the intended behavior.
pub struct History {
    turns: Vec<Turn>,
    max_turns: usize,
    store: Box<dyn TranscriptStore>,
}

impl History {
    /// Load persisted turns, keeping only the most recent `max_turns`.
    ///
    /// Missing state starts an empty history silently; unreadable or
    /// malformed state starts an empty history and flags the report.
    pub async fn open(store: Box<dyn TranscriptStore>, max_turns: usize) -> (Self, LoadReport) {
        let mut report = LoadReport::default();

        let turns = match store.load().await {
            Loaded::Missing => Vec::new(),
            Loaded::Malformed => {
                report.malformed = true;
                Vec::new()
            }
            Loaded::Turns(mut turns) => {
                if turns.len() > max_turns {
                    report.truncated_from = Some(turns.len());
                    turns = turns.split_off(turns.len() - max_turns);
                }
                turns
            }
        };

        (
            Self {
                turns,
                max_turns,
                store,
            },
            report,
        )
    }

    /// Append one turn, evicting the oldest if the cap is exceeded, then
    /// persist. On a persistence error the in-memory history stays mutated
    /// and the error is returned for the caller to report.
    pub async fn push(&mut self, role: Role, content: impl Into<String>) -> Result<(), StoreError> {
        self.turns.push(Turn::new(role, content));
        if self.turns.len() > self.max_turns {
            self.turns.remove(0);
        }
        self.store.save(&self.turns).await
    }

    /// Empty the history and persist the empty state.
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.turns.clear();
        self.store.save(&self.turns).await
    }

    /// Persist the current state without mutating. Used on exit.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.store.save(&self.turns).await
    }

    /// Read-only view in chronological order, for prompt construction.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

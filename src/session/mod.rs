//! Chat Session
//!
//! Owns the bounded history plus both remote clients, and implements the
//! append policy around each interaction:
//! - chat: user turn first, assistant turn only for a non-empty reply
//! - wiki: a synthetic user/assistant pair for every outcome, so failed
//!   lookups stay part of the conversational record
//!
//! Persistence failures are warnings; the in-memory history stays
//! authoritative for the rest of the session.

use crate::core::llm::{GenerateOutcome, LlmClient};
use crate::history::{History, Role, Turn};
use crate::storage::StoreError;
use crate::tools::wiki::{WikiOutcome, WikiTool};
use crate::utils;

pub struct ChatSession {
    history: History,
    llm: Option<LlmClient>,
    wiki: WikiTool,
}

impl ChatSession {
    /// `llm` is `None` when no API key is configured; chat attempts then
    /// report the missing credential while wiki and clear keep working.
    pub fn new(history: History, llm: Option<LlmClient>, wiki: WikiTool) -> Self {
        Self { history, llm, wiki }
    }

    /// Send one chat message. Returns `None` when no credential is
    /// configured; the user turn is recorded either way.
    pub async fn chat(&mut self, text: &str) -> Option<GenerateOutcome> {
        self.record(Role::User, text).await;

        let llm = self.llm.as_ref()?;
        let outcome = llm.generate(self.history.snapshot(), text).await;

        if let GenerateOutcome::Text(reply) = &outcome {
            let reply = reply.clone();
            self.record(Role::Assistant, reply).await;
        }

        Some(outcome)
    }

    /// Look up a Wikipedia summary and record the exchange.
    pub async fn wiki_lookup(&mut self, topic: &str) -> WikiOutcome {
        let outcome = self.wiki.lookup(topic).await;

        let reply = match &outcome {
            WikiOutcome::Summary(summary) => {
                format!("Here's a Wikipedia summary for '{}': {}", topic, summary)
            }
            WikiOutcome::NotFound => {
                format!("Sorry, I could not find a Wikipedia page for '{}'.", topic)
            }
            WikiOutcome::Ambiguous(_) => {
                format!("The term '{}' is ambiguous. Please be more specific.", topic)
            }
            WikiOutcome::Failed(_) => format!(
                "Sorry, an error occurred while fetching the Wikipedia summary for '{}'.",
                topic
            ),
        };

        self.record(
            Role::User,
            format!("Can you give me a Wikipedia summary for {}?", topic),
        )
        .await;
        self.record(Role::Assistant, reply).await;

        outcome
    }

    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.history.clear().await
    }

    /// Persist the current state, for the exit path.
    pub async fn persist(&self) -> Result<(), StoreError> {
        self.history.save().await
    }

    pub fn turn_count(&self) -> usize {
        self.history.len()
    }

    pub fn snapshot(&self) -> &[Turn] {
        self.history.snapshot()
    }

    async fn record(&mut self, role: Role, content: impl Into<String>) {
        if let Err(e) = self.history.push(role, content).await {
            utils::print_warning(&format!("Could not save history: {}", e));
        }
    }
}

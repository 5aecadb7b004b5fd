//! Gembot - command-line Gemini chatbot
//!
//! This library provides a bounded, persisted conversation history, a
//! Gemini generateContent client, and a Wikipedia lookup tool, wired
//! together by an interactive REPL.

pub mod cli;
pub mod config;
pub mod core;
pub mod history;
pub mod repl;
pub mod session;
pub mod storage;
pub mod tools;
pub mod utils;

pub use crate::config::Settings;
pub use crate::core::llm::{GenerateOutcome, LlmClient};
pub use crate::history::{History, LoadReport, Role, Turn};
pub use crate::session::ChatSession;
pub use crate::storage::StoreError;
pub use crate::tools::wiki::{WikiOutcome, WikiTool};

//! Command Dispatcher / REPL
//!
//! Reads one line at a time and routes it: built-in slash commands
//! (exit, clear-history, wiki) or ordinary chat. Interrupt and end-of-input
//! take the same farewell path as `/exit`, with a final persist. An
//! in-flight remote call cannot be cancelled; signals are only observed
//! between lines.

use crate::config::Settings;
use crate::core::llm::GenerateOutcome;
use crate::session::ChatSession;
use crate::tools::wiki::WikiOutcome;
use crate::utils;
use anyhow::Result;
use tokio::io::{self, AsyncBufReadExt, BufReader};

/// One line of input, classified. Command tokens are case-insensitive;
/// the wiki topic keeps its original case.
#[derive(Debug, PartialEq)]
pub enum Command<'a> {
    Empty,
    Exit,
    ClearHistory,
    Wiki(&'a str),
    Chat(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        if trimmed.eq_ignore_ascii_case("/exit") || trimmed.eq_ignore_ascii_case("/quit") {
            return Command::Exit;
        }
        if trimmed.eq_ignore_ascii_case("/clear_history") {
            return Command::ClearHistory;
        }

        let mut parts = trimmed.splitn(2, char::is_whitespace);
        if parts.next().unwrap_or("").eq_ignore_ascii_case("/wiki") {
            return Command::Wiki(parts.next().unwrap_or("").trim());
        }

        Command::Chat(trimmed)
    }
}

/// Drive the interactive loop until exit, interrupt, or end of input.
pub async fn run(session: &mut ChatSession, settings: &Settings) -> Result<()> {
    utils::print_header("Gemini API Bot");
    utils::print_info(&format!("Using model: {}", settings.llm.model));
    utils::print_info(&format!(
        "Chat history will be loaded from/saved to '{}'.",
        settings.history.file
    ));
    utils::print_info(&format!(
        "History is limited to the last {} messages.",
        settings.history.max_turns
    ));
    utils::print_info("Type '/exit', '/quit', '/wiki <topic>', or '/clear_history'.");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        utils::print_prompt("\nYour prompt: ");
        let mut input = String::new();

        let read = tokio::select! {
            read = reader.read_line(&mut input) => read?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                return farewell(session).await;
            }
        };

        // Ctrl-D / end of input
        if read == 0 {
            println!();
            return farewell(session).await;
        }

        match Command::parse(&input) {
            Command::Empty => continue,
            Command::Exit => return farewell(session).await,
            Command::ClearHistory => {
                if let Err(e) = session.clear().await {
                    utils::print_warning(&format!("Could not save history: {}", e));
                }
                utils::print_success("Chat history cleared.");
            }
            Command::Wiki(topic) => handle_wiki(session, topic).await,
            Command::Chat(text) => handle_chat(session, settings, text).await,
        }
    }
}

async fn farewell(session: &ChatSession) -> Result<()> {
    if let Err(e) = session.persist().await {
        utils::print_warning(&format!("Could not save history: {}", e));
    }
    utils::print_info("Goodbye!");
    Ok(())
}

async fn handle_chat(session: &mut ChatSession, settings: &Settings, text: &str) {
    utils::print_info(&format!("Sending prompt to Gemini ({})...", settings.llm.model));

    match session.chat(text).await {
        Some(outcome) => print_outcome(&outcome),
        None => print_missing_api_key(),
    }
}

async fn handle_wiki(session: &mut ChatSession, topic: &str) {
    if topic.is_empty() {
        utils::print_info("Please specify a topic for Wikipedia. Usage: /wiki <topic>");
        return;
    }

    utils::print_info(&format!("Fetching Wikipedia summary for '{}'...", topic));

    match session.wiki_lookup(topic).await {
        WikiOutcome::Summary(summary) => {
            utils::print_header(&format!("Wiki Summary for '{}'", topic));
            println!("{}", summary);
        }
        WikiOutcome::NotFound => {
            utils::print_error(&format!("Could not find a Wikipedia page for '{}'.", topic));
        }
        WikiOutcome::Ambiguous(options) => {
            utils::print_error(&format!(
                "'{}' refers to multiple pages. Please be more specific.",
                topic
            ));
            if !options.is_empty() {
                utils::print_info(&format!("Options might include: {}", options.join(", ")));
            }
        }
        WikiOutcome::Failed(message) => {
            utils::print_error(&format!("Error fetching wiki summary: {}", message));
        }
    }
}

/// Print a classified generation result. Shared with one-shot mode.
pub fn print_outcome(outcome: &GenerateOutcome) {
    match outcome {
        GenerateOutcome::Text(text) => {
            utils::print_header("Gemini's Response");
            println!("{}", text);
        }
        GenerateOutcome::Blocked(reason) => {
            utils::print_warning("Prompt was blocked.");
            utils::print_warning(&format!("Reason: {}", reason));
        }
        GenerateOutcome::Empty => {
            utils::print_info("No response text received.");
        }
        GenerateOutcome::TransportError(message) => {
            utils::print_error(&format!("An error occurred: {}", message));
            utils::print_error("Ensure your API key is correct and you have internet connectivity.");
        }
    }
}

pub fn print_missing_api_key() {
    utils::print_error("Error: GEMINI_API_KEY environment variable not set.");
    utils::print_info("Please set it before running gembot.");
    utils::print_info(
        "You can get an API key from Google AI Studio: https://aistudio.google.com/app/apikey",
    );
}

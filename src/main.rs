use anyhow::{Context, Result};
use clap::Parser;
use gembot::cli::Cli;
use gembot::storage::filesystem::JsonFileStore;
use gembot::{repl, utils};
use gembot::{ChatSession, History, LlmClient, Settings, WikiTool};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = Settings::new().context("Failed to load settings")?;
    if let Some(model) = cli.model {
        settings.llm.model = model;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .init();

    let store = JsonFileStore::new(&settings.history.file);
    let (history, report) = History::open(Box::new(store), settings.history.max_turns).await;

    if report.malformed {
        utils::print_warning(&format!(
            "Could not decode '{}'. Starting with an empty history.",
            settings.history.file
        ));
    }
    if let Some(original) = report.truncated_from {
        utils::print_info(&format!(
            "History file has {} messages. Truncating to last {}.",
            original, settings.history.max_turns
        ));
    }

    match cli.prompt {
        Some(prompt) => handle_prompt(history, &settings, &prompt).await,
        None => handle_interactive(history, settings).await,
    }
}

/// One-shot mode: the loaded history is context only; nothing is recorded.
async fn handle_prompt(history: History, settings: &Settings, prompt: &str) -> Result<()> {
    let api_key = match Settings::api_key() {
        Ok(key) => key,
        Err(_) => {
            repl::print_missing_api_key();
            return Ok(());
        }
    };

    let llm = LlmClient::new(api_key, settings.clone());
    utils::print_info(&format!("Sending prompt to Gemini ({})...", settings.llm.model));

    let outcome = llm.generate(history.snapshot(), prompt).await;
    repl::print_outcome(&outcome);
    Ok(())
}

async fn handle_interactive(history: History, settings: Settings) -> Result<()> {
    // A missing key is not fatal here: /wiki and /clear_history keep working
    let llm = match Settings::api_key() {
        Ok(key) => Some(LlmClient::new(key, settings.clone())),
        Err(_) => {
            repl::print_missing_api_key();
            None
        }
    };

    let wiki = WikiTool::new(settings.wiki.endpoint.clone(), settings.wiki.timeout_secs);
    let mut session = ChatSession::new(history, llm, wiki);

    repl::run(&mut session, &settings).await
}

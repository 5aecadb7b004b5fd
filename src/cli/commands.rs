use clap::Parser;

#[derive(Parser)]
#[command(name = "gembot")]
#[command(author, version, about = "Command-line Gemini chatbot with persistent history", long_about = None)]
pub struct Cli {
    /// Prompt to send as a one-shot request; omit to start an interactive session
    pub prompt: Option<String>,

    /// The model to use (default: gemini-1.5-flash-latest)
    #[arg(short, long)]
    pub model: Option<String>,
}

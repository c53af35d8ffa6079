use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ollachat", version, about = "Ollama web chat front-end", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web chat server
    Serve,

    /// Chat with the configured model from the terminal
    Chat {
        /// Model to chat with, defaults to the configured one
        #[arg(short, long)]
        model: Option<String>,
    },
}

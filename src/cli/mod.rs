pub mod commands;

use std::io::{self, Write};
use tokio::sync::mpsc;

use crate::chat::stream_exchange;
use crate::cli::commands::Commands;
use crate::config::AppConfig;
use crate::llm::{ChatProvider, ProviderFactory};
use crate::session;

pub async fn run_cli(command: Commands, config_path: String) {
    let config = AppConfig::load(&config_path).expect("Failed to load config");

    match command {
        Commands::Serve => {
            panic!("Serve command should be intercepted by main.rs to boot actix-web");
        }
        Commands::Chat { model } => {
            run_repl(model, config).await;
        }
    }
}

async fn run_repl(model: Option<String>, config: AppConfig) {
    let llm = ProviderFactory::create_default(&config);

    // Same startup check the server performs: bail out early if the Ollama
    // server is not reachable.
    let models = match llm.list_models().await {
        Ok(models) => models,
        Err(e) => {
            eprintln!(
                "Ollama is not reachable at {}: {}. Make sure it is installed and running (https://ollama.ai).",
                config.ollama.base_url, e
            );
            return;
        }
    };

    let model = model.unwrap_or_else(|| config.ollama.default_model.clone());
    let session = session::shared(&config.chat.greeting);

    println!("--- Ollachat Terminal Chat ---");
    println!(
        "Provider: {} | Model: {} ({} installed)",
        llm.name(),
        model,
        models.len()
    );
    println!("Type /exit to quit.");
    println!("------------------------------");
    println!("\n{}", config.chat.greeting);

    loop {
        print!("\nUser> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            break;
        }
        let text = input.trim();

        if text.is_empty() {
            continue;
        }
        if text == "/exit" || text == "/quit" {
            break;
        }

        let (tx, mut rx) = mpsc::channel::<String>(100);

        print!("Assistant> ");
        io::stdout().flush().unwrap();

        let handle = tokio::spawn(stream_exchange(
            llm.clone(),
            session.clone(),
            config.chat.system_prompt.clone(),
            model.clone(),
            text.to_string(),
            tx,
        ));

        // Each received value is the cumulative reply; print only the suffix
        // that is new since the last one.
        let mut printed = 0;
        while let Some(cumulative) = rx.recv().await {
            print!("{}", &cumulative[printed..]);
            io::stdout().flush().unwrap();
            printed = cumulative.len();
        }
        println!();

        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => eprintln!("Error: {}", e),
            Err(e) => eprintln!("Error: exchange task failed: {}", e),
        }
    }
}

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use ollachat::cli::{
    commands::{Cli, Commands},
    run_cli,
};
use ollachat::config::AppConfig;
use ollachat::llm::{ChatProvider, ProviderFactory};
use ollachat::session;
use tracing::{error, info};

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

async fn index() -> impl Responder {
    let html = include_str!("../static/index.html");
    HttpResponse::Ok().content_type("text/html").body(html)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        run_cli(cli.command, cli.config).await;
        return Ok(());
    }

    info!("Starting Ollachat server...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let llm_provider = ProviderFactory::create_default(&config);
    info!("Using LLM provider: {}", llm_provider.name());

    // Startup dependency check: refuse to serve when Ollama is unreachable.
    match llm_provider.list_models().await {
        Ok(models) => info!("Ollama reachable, {} model(s) installed", models.len()),
        Err(e) => {
            error!(
                "Ollama is not reachable at {}: {}. Make sure it is installed and running (https://ollama.ai).",
                config.ollama.base_url, e
            );
            std::process::exit(1);
        }
    }

    let session = session::shared(&config.chat.greeting);

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(session.clone()))
            .app_data(web::Data::new(llm_provider.clone()))
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .configure(ollachat::api::routes::configure)
            .configure(ollachat::api::websocket::configure)
    })
    .bind((host, port))?
    .run()
    .await
}

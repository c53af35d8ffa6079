use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Instruction turn appended to every request, after the stored history.
    pub system_prompt: String,
    /// Assistant turn the session is seeded with.
    pub greeting: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ollama: OllamaConfig,
    pub chat: ChatConfig,
}

const DEFAULT_SYSTEM_PROMPT: &str = "Your name is Alexa. You are a helpful assistant. \
Greet the user the first time. You can provide solutions to any question, max 20 words only.";

const DEFAULT_GREETING: &str = "Hello, I am Alia. How can I help you?";

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("ollama.base_url", "http://localhost:11434")?
            .set_default("ollama.default_model", "llama2")?
            .set_default("chat.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("chat.greeting", DEFAULT_GREETING)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("OLLACHAT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

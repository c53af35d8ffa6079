pub mod models;
pub mod ollama;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::Sender;

use crate::config::AppConfig;
use models::{Message, ModelInfo};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error {status}: {body}")]
    Api { status: u16, body: String },
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Lists the models installed on the backing server. Also used as the
    /// startup reachability probe.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;

    /// Streams one chat completion. Every value sent on `tx` is the
    /// *cumulative* assistant text so far, each superseding the previous
    /// one, in strict arrival order. Returns the final accumulated reply.
    ///
    /// A non-success status or transport failure yields `Err` and the
    /// sequence on `tx` simply ends; callers must not treat anything as
    /// committed until this returns `Ok`.
    async fn chat_streaming(
        &self,
        messages: &[Message],
        model: &str,
        tx: Sender<String>,
    ) -> Result<String, LlmError>;
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Arc<dyn ChatProvider> {
        Arc::new(ollama::OllamaProvider::new(
            config.ollama.base_url.clone(),
            config.ollama.default_model.clone(),
        ))
    }
}

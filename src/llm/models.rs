use serde::{Deserialize, Serialize};

/// Wire-level chat message as the Ollama API expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// One installed model as reported by the model directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
}

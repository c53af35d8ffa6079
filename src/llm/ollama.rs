use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::json;
use tokio::sync::mpsc::Sender;

use crate::llm::{
    models::{Message, ModelInfo},
    ChatProvider, LlmError,
};

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    default_model: String,
}

impl OllamaProvider {
    pub fn new(base_url: String, default_model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            default_model,
        }
    }
}

/// Extracts the `message.content` delta from one NDJSON line. Lines that
/// are not valid JSON, or valid objects without a content field (the final
/// `done` marker, for instance), yield `None` and are skipped by the caller.
pub fn chunk_delta(line: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(line).ok()?;
    json["message"]["content"].as_str().map(|s| s.to_string())
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let models = json["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str())
                    .map(|name| ModelInfo {
                        name: name.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn chat_streaming(
        &self,
        messages: &[Message],
        model: &str,
        tx: Sender<String>,
    ) -> Result<String, LlmError> {
        let model = if model.is_empty() {
            &self.default_model
        } else {
            model
        };

        let body = json!({
            "model": model,
            "stream": true,
            "messages": messages,
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let mut stream = response.bytes_stream();
        let mut accumulated = String::new();
        // A line, or even a single multi-byte character, can split across
        // reads. Carry raw bytes and decode only complete lines.
        let mut carry: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| LlmError::Network(e.to_string()))?;
            carry.extend_from_slice(&bytes);

            while let Some(pos) = carry.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = carry.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Some(delta) = chunk_delta(line) {
                    accumulated.push_str(&delta);
                    let _ = tx.send(accumulated.clone()).await;
                }
            }
        }

        // Trailing line without a terminating newline.
        let line = String::from_utf8_lossy(&carry);
        let line = line.trim();
        if !line.is_empty() {
            if let Some(delta) = chunk_delta(line) {
                accumulated.push_str(&delta);
                let _ = tx.send(accumulated.clone()).await;
            }
        }

        Ok(accumulated)
    }
}

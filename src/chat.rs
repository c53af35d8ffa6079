use std::sync::Arc;
use tokio::sync::mpsc::Sender;

use crate::llm::{models::Message, ChatProvider, LlmError};
use crate::session::{SharedSession, Turn};

/// Builds the wire payload for one submission: the stored history, then the
/// fixed system instruction, then the new user turn. The instruction is
/// re-sent on every call.
pub fn build_messages(history: &[Turn], system_prompt: &str, user_text: &str) -> Vec<Message> {
    let mut messages: Vec<Message> = history
        .iter()
        .map(|turn| Message {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        })
        .collect();

    messages.push(Message {
        role: "system".to_string(),
        content: system_prompt.to_string(),
    });
    messages.push(Message {
        role: "user".to_string(),
        content: user_text.to_string(),
    });

    messages
}

/// Runs one user submission end to end. Cumulative assistant text flows
/// through `tx` while the response streams; the user and assistant turns
/// are committed to the session only once the stream has fully drained.
/// On any failure the session is left untouched.
pub async fn stream_exchange(
    provider: Arc<dyn ChatProvider>,
    session: SharedSession,
    system_prompt: String,
    model: String,
    user_text: String,
    tx: Sender<String>,
) -> Result<String, LlmError> {
    let messages = {
        let session = session.lock().unwrap();
        build_messages(session.turns(), &system_prompt, &user_text)
    };

    // The lock is released before the network boundary; nothing else
    // mutates the session while this exchange is in flight.
    let reply = provider.chat_streaming(&messages, &model, tx).await?;

    session.lock().unwrap().commit_exchange(&user_text, &reply);
    Ok(reply)
}

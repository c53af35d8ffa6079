use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures_util::StreamExt as _;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::api::models_ws::{WsClientMessage, WsServerMessage};
use crate::chat::stream_exchange;
use crate::config::AppConfig;
use crate::llm::ChatProvider;
use crate::session::SharedSession;

#[get("/ws/chat")]
pub async fn ws_chat(
    req: HttpRequest,
    body: web::Payload,
    session: web::Data<SharedSession>,
    llm: web::Data<Arc<dyn ChatProvider>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, Error> {
    let (response, mut ws, mut msg_stream) = actix_ws::handle(&req, body)?;

    info!("WebSocket connection established");

    // web::Data<T> behaves like an Arc<T>; deref and clone to get the inner values out.
    let llm_arc = llm.as_ref().clone();
    let session_arc = session.as_ref().clone();
    let config = config.as_ref().clone();

    actix_web::rt::spawn(async move {
        while let Some(Ok(msg)) = msg_stream.next().await {
            match msg {
                Message::Ping(bytes) => {
                    if ws.pong(&bytes).await.is_err() {
                        return;
                    }
                }
                Message::Text(text) => {
                    let client_msg: Result<WsClientMessage, _> = serde_json::from_str(&text);
                    if let Ok(msg) = client_msg {
                        if msg.r#type == "message" && !msg.content.trim().is_empty() {
                            // Awaiting here serializes submissions: the next
                            // client message is not read until this exchange
                            // has run to completion or failure.
                            handle_chat_message(
                                msg,
                                session_arc.clone(),
                                llm_arc.clone(),
                                &config,
                                &mut ws,
                            )
                            .await;
                        }
                    }
                }
                Message::Close(reason) => {
                    let _ = ws.close(reason).await;
                    break;
                }
                _ => {}
            }
        }
        info!("WebSocket connection closed");
    });

    Ok(response)
}

async fn handle_chat_message(
    msg: WsClientMessage,
    session: SharedSession,
    llm: Arc<dyn ChatProvider>,
    config: &AppConfig,
    ws: &mut actix_ws::Session,
) {
    let model = msg
        .model
        .unwrap_or_else(|| config.ollama.default_model.clone());

    let (tx, mut rx) = mpsc::channel::<String>(100);

    // The exchange runs in the background so this loop can forward chunks
    // to the browser as they arrive.
    let handle = tokio::spawn(stream_exchange(
        llm,
        session,
        config.chat.system_prompt.clone(),
        model,
        msg.content,
        tx,
    ));

    while let Some(cumulative) = rx.recv().await {
        let resp = WsServerMessage {
            r#type: "chunk".to_string(),
            content: cumulative,
        };
        if ws.text(serde_json::to_string(&resp).unwrap()).await.is_err() {
            // Client likely disconnected; the exchange still runs to
            // completion so the session stays consistent.
            break;
        }
    }

    let outcome = match handle.await {
        Ok(Ok(_)) => WsServerMessage {
            r#type: "done".to_string(),
            content: String::new(),
        },
        Ok(Err(e)) => {
            error!("Chat streaming error: {}", e);
            WsServerMessage {
                r#type: "error".to_string(),
                content: e.to_string(),
            }
        }
        Err(e) => {
            error!("Chat exchange task failed: {}", e);
            WsServerMessage {
                r#type: "error".to_string(),
                content: "internal error".to_string(),
            }
        }
    };
    let _ = ws.text(serde_json::to_string(&outcome).unwrap()).await;
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(ws_chat);
}

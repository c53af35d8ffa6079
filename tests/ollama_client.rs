#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;

    use ollachat::llm::{
        models::Message,
        ollama::{chunk_delta, OllamaProvider},
        ChatProvider, LlmError,
    };

    /// Serves exactly one HTTP exchange with a canned response, standing in
    /// for the Ollama server. Returns the base URL to point the client at.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;

            let response = format!(
                "{}\r\nContent-Type: application/x-ndjson\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    /// Like `serve_once`, but delivers the 200 body in two TCP segments with
    /// a pause in between, so the client sees the split as separate reads.
    async fn serve_once_split(first: &'static [u8], second: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;

            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                first.len() + second.len()
            );
            socket.write_all(header.as_bytes()).await.unwrap();
            socket.write_all(first).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            socket.write_all(second).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    /// Reads headers plus a Content-Length body so the client never sees the
    /// connection drop mid-request.
    async fn read_request(socket: &mut TcpStream) {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(idx) = text.find("\r\n\r\n") {
                let content_length = text[..idx]
                    .lines()
                    .find_map(|line| {
                        line.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .and_then(|v| v.trim().parse::<usize>().ok())
                    })
                    .unwrap_or(0);
                if data.len() >= idx + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn provider(base_url: String) -> OllamaProvider {
        OllamaProvider::new(base_url, "llama2".to_string())
    }

    fn user_message(content: &str) -> Vec<Message> {
        vec![Message {
            role: "user".to_string(),
            content: content.to_string(),
        }]
    }

    #[test]
    fn test_provider_name() {
        let provider = provider("http://localhost:11434".to_string());
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_chunk_delta_extraction() {
        assert_eq!(
            chunk_delta(r#"{"message":{"content":"Hi"}}"#),
            Some("Hi".to_string())
        );
        // The final done marker has no content field.
        assert_eq!(chunk_delta(r#"{"done":true}"#), None);
        assert_eq!(chunk_delta("not json at all"), None);
    }

    #[tokio::test]
    async fn test_streaming_accumulates_in_arrival_order() {
        let base_url = serve_once(
            "HTTP/1.1 200 OK",
            "{\"message\":{\"content\":\"Hi\"}}\n{\"message\":{\"content\":\" there\"}}\n{\"done\":true}\n",
        )
        .await;

        let (tx, mut rx) = mpsc::channel(100);
        let reply = provider(base_url)
            .chat_streaming(&user_message("Hello"), "llama2", tx)
            .await
            .unwrap();

        assert_eq!(reply, "Hi there");

        let mut yielded = Vec::new();
        while let Ok(cumulative) = rx.try_recv() {
            yielded.push(cumulative);
        }
        assert_eq!(yielded, vec!["Hi".to_string(), "Hi there".to_string()]);
    }

    #[tokio::test]
    async fn test_multibyte_char_split_across_reads() {
        // The two bytes of the 'é' in "café" arrive in separate reads; the
        // raw-byte carry must reassemble them instead of decoding each
        // fragment on its own.
        let base_url = serve_once_split(
            b"{\"message\":{\"content\":\"caf\xc3",
            b"\xa9\"}}\n",
        )
        .await;

        let (tx, mut rx) = mpsc::channel(100);
        let reply = provider(base_url)
            .chat_streaming(&user_message("Hello"), "llama2", tx)
            .await
            .unwrap();

        assert_eq!(reply, "café");
        assert_eq!(rx.try_recv().unwrap(), "café");
    }

    #[tokio::test]
    async fn test_malformed_chunk_is_skipped() {
        let base_url = serve_once(
            "HTTP/1.1 200 OK",
            "{\"message\":{\"content\":\"Hi\"}}\nthis is not json\n{\"message\":{\"content\":\" there\"}}\n",
        )
        .await;

        let (tx, _rx) = mpsc::channel(100);
        let reply = provider(base_url)
            .chat_streaming(&user_message("Hello"), "llama2", tx)
            .await
            .unwrap();

        // The bad line neither truncates the reply nor aborts the stream.
        assert_eq!(reply, "Hi there");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let base_url = serve_once("HTTP/1.1 500 Internal Server Error", "boom").await;

        let (tx, mut rx) = mpsc::channel(100);
        let result = provider(base_url)
            .chat_streaming(&user_message("Hello"), "llama2", tx)
            .await;

        assert!(matches!(result, Err(LlmError::Api { status: 500, .. })));
        // Nothing was yielded before the failure.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_network_error() {
        // Grab a free port, then close the listener so nothing answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (tx, _rx) = mpsc::channel(100);
        let result = provider(format!("http://{}", addr))
            .chat_streaming(&user_message("Hello"), "llama2", tx)
            .await;

        assert!(matches!(result, Err(LlmError::Network(_))));
    }

    #[tokio::test]
    async fn test_list_models_parses_names() {
        let base_url = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"models":[{"name":"llama2","size":3825819519},{"name":"mistral","size":4109865159}]}"#,
        )
        .await;

        let models = provider(base_url).list_models().await.unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["llama2", "mistral"]);
    }

    #[tokio::test]
    async fn test_list_models_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = provider(format!("http://{}", addr)).list_models().await;
        assert!(matches!(result, Err(LlmError::Network(_))));
    }
}

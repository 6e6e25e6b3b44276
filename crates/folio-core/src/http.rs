//! HTTP generation client

use crate::client::{GenerationClient, GenerationPrompt, GenerationResponse};
use crate::config::ServiceConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

/// Client for a service behind an HTTP endpoint
///
/// POSTs the prompt as JSON. A JSON response is read whole; any other
/// content type is streamed.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGenerationClient {
    /// Create client for a configured service
    ///
    /// # Errors
    /// - `GenerationError::Unconfigured` if no endpoint is set
    /// - `GenerationError::Transport` if the HTTP client cannot be built
    pub fn new(config: &ServiceConfig) -> Result<Self, GenerationError> {
        let endpoint = config.endpoint.clone().ok_or(GenerationError::Unconfigured)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GenerationError::transport)?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// Target URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(
        &self,
        prompt: &GenerationPrompt,
    ) -> Result<GenerationResponse, GenerationError> {
        tracing::debug!("POST {} ({} for '{}')", self.endpoint, prompt.kind, prompt.heading);

        let mut request = self.http.post(&self.endpoint).json(prompt);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(GenerationError::transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status { code: status.as_u16() });
        }
        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(GenerationError::NoBody);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim_start().starts_with("application/json"));

        if is_json {
            let body = response.bytes().await.map_err(GenerationError::transport)?;
            if body.is_empty() {
                return Err(GenerationError::NoBody);
            }
            Ok(GenerationResponse::Complete(body))
        } else {
            let stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(GenerationError::transport));
            Ok(GenerationResponse::Streamed(Box::pin(stream)))
        }
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::ContentKind;
    use folio_stream::{decode_single, decode_stream};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response, returning the raw request text
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/generate", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });
        (url, handle)
    }

    fn prompt() -> GenerationPrompt {
        GenerationPrompt {
            kind: ContentKind::Diagram,
            heading: "Deploy".to_string(),
            body: "Ship it.".to_string(),
        }
    }

    fn client(url: String, api_key: Option<&str>) -> HttpGenerationClient {
        HttpGenerationClient::new(&ServiceConfig {
            endpoint: Some(url),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn requires_endpoint() {
        let err = HttpGenerationClient::new(&ServiceConfig::default()).unwrap_err();
        assert_eq!(err, GenerationError::Unconfigured);
    }

    #[tokio::test]
    async fn streams_text_body_and_sends_prompt() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\nconnection: close\r\n\r\n\
             0:{\"type\":\"text-delta\",\"delta\":\"graph TD\"}\n",
        )
        .await;

        let response = client(url, Some("tok")).generate(&prompt()).await.unwrap();
        let GenerationResponse::Streamed(stream) = response else {
            panic!("expected streamed response");
        };
        let decoded = decode_stream(stream).await.unwrap();
        assert_eq!(decoded.text, "graph TD");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /generate"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer tok"));
        assert!(request.contains("\"heading\":\"Deploy\""));
        assert!(request.contains("\"kind\":\"diagram\""));
    }

    #[tokio::test]
    async fn json_body_is_complete() {
        let (url, _server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 20\r\nconnection: close\r\n\r\n\
             {\"text\":\"graph LR\"}\n",
        )
        .await;

        let response = client(url, None).generate(&prompt()).await.unwrap();
        let GenerationResponse::Complete(body) = response else {
            panic!("expected complete response");
        };
        assert_eq!(decode_single(&body).text, "graph LR");
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let (url, _server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let err = client(url, None).generate(&prompt()).await.unwrap_err();
        assert_eq!(err, GenerationError::Status { code: 503 });
    }

    #[tokio::test]
    async fn empty_body_is_no_body() {
        let (url, _server) =
            serve_once("HTTP/1.1 204 No Content\r\nconnection: close\r\n\r\n").await;
        let err = client(url, None).generate(&prompt()).await.unwrap_err();
        assert_eq!(err, GenerationError::NoBody);
    }

    #[tokio::test]
    async fn connection_refused_is_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/generate", listener.local_addr().unwrap());
        drop(listener);
        let err = client(url, None).generate(&prompt()).await.unwrap_err();
        assert!(err.is_transport());
    }
}

use std::time::Duration;

use async_trait::async_trait;
use derive_builder::Builder;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use tracing::{debug, info};

use crate::{ChatRequest, ChatResponse, CompletionMessage, Error};

/// Seam between the turn orchestration and the wire. Production uses the
/// HTTP [`Client`]; tests script responses through this trait.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<CompletionMessage, Error>;
}

/// HTTP client for an OpenAI-compatible `chat/completions` endpoint
#[derive(Clone, Builder)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    #[builder(default)]
    api_key: Option<String>,
    #[builder(default = "Duration::from_secs(60)")]
    timeout: Duration,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        // Validate the path doesn't contain certain patterns
        if path.contains("://") || path.contains("..") {
            return Err(Error::InvalidUrl(format!(
                "path contains forbidden patterns: {path}"
            )));
        }

        // Remove leading slash to avoid double slashes
        let path = path.trim_start_matches('/');

        let base = if self.base_url.as_str().ends_with('/') {
            self.base_url.clone()
        } else {
            Url::parse(&format!("{}/", self.base_url))
                .map_err(|error| Error::InvalidUrl(error.to_string()))?
        };

        base.join(path)
            .map_err(|error| Error::InvalidUrl(error.to_string()))
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ref api_key) = self.api_key {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn inner_chat(&self, request: &ChatRequest) -> Result<CompletionMessage, Error> {
        let url = self.url("chat/completions")?;

        info!(
            url = %url,
            model = %request.model,
            message_count = %request.message_count(),
            "Connecting upstream"
        );

        let response = self
            .http
            .post(url)
            .headers(self.headers())
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    Error::Timeout(self.timeout)
                } else {
                    Error::Transport(error)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %body, "Upstream returned an error status");
            return Err(Error::InvalidStatusCode { status: status.as_u16(), body });
        }

        let parsed: ChatResponse = response.json().await.map_err(Error::Transport)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Processing usage information"
            );
        }

        CompletionMessage::try_from(parsed)
    }
}

#[async_trait]
impl ChatCompletion for Client {
    async fn chat(&self, request: &ChatRequest) -> Result<CompletionMessage, Error> {
        self.inner_chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tutor_domain::ErrorCategory;

    use super::*;

    fn create_client(base_url: &str) -> Client {
        Client::builder()
            .http(reqwest::Client::new())
            .base_url(Url::parse(base_url).unwrap())
            .api_key(Some("test-api-key".to_string()))
            .build()
            .unwrap()
    }

    fn create_content_response(content: &str) -> serde_json::Value {
        json!({
            "choices": [{
                "message": {"content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
        })
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mut fixture = mockito::Server::new_async().await;
        let mock = fixture
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-api-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(create_content_response("{\"message\": \"hi\"}").to_string())
            .create_async()
            .await;

        let client = create_client(&fixture.url());
        let actual = client.chat(&ChatRequest::new("gpt-4o-mini")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(actual.text(), Some("{\"message\": \"hi\"}"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_an_auth_error() {
        let mut fixture = mockito::Server::new_async().await;
        let mock = fixture
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(json!({"error": {"message": "Invalid API key"}}).to_string())
            .create_async()
            .await;

        let client = create_client(&fixture.url());
        let actual = client.chat(&ChatRequest::new("gpt-4o-mini")).await;

        mock.assert_async().await;
        let error = actual.unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Auth);
    }

    #[tokio::test]
    async fn test_error_payload_on_success_status() {
        let mut fixture = mockito::Server::new_async().await;
        let mock = fixture
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"error": {"message": "maximum context length exceeded", "code": 400}})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = create_client(&fixture.url());
        let actual = client.chat(&ChatRequest::new("gpt-4o-mini")).await;

        mock.assert_async().await;
        assert!(matches!(actual, Err(Error::Upstream { .. })));
    }

    #[tokio::test]
    async fn test_tool_calls_round_trip() {
        let mut fixture = mockito::Server::new_async().await;
        let mock = fixture
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "message": {
                            "content": null,
                            "tool_calls": [{
                                "id": "call_1",
                                "type": "function",
                                "function": {"name": "calculate", "arguments": "{\"expression\": \"3+7\"}"}
                            }]
                        },
                        "finish_reason": "tool_calls"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = create_client(&fixture.url());
        let actual = client.chat(&ChatRequest::new("gpt-4o-mini")).await.unwrap();

        mock.assert_async().await;
        assert!(actual.has_tool_calls());
        let (requests, failures) = actual.calculation_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].expression, "3+7");
        assert_eq!(failures, vec![]);
    }

    #[test]
    fn test_url_rejects_traversal() {
        let client = create_client("http://localhost:1234");
        assert!(client.url("../secrets").is_err());
        assert!(client.url("https://elsewhere/v1").is_err());
    }
}

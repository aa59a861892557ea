use std::env;
use std::time::Duration;

use anyhow::Context;
use derive_setters::Setters;
use reqwest::Url;
use tutor_domain::SessionConfig;
use tutor_provider::Client;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_VISION_MODEL: &str = "gpt-4o";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Process-level configuration, resolved once at startup
#[derive(Clone, Debug, Setters)]
#[setters(into, strip_option)]
pub struct Environment {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub chat_model: String,
    pub vision_model: String,
    pub bind_addr: String,
    pub request_timeout: Duration,
    pub session: SessionConfig,
}

impl Environment {
    /// Read configuration from the process environment. Only the API key
    /// is required; everything else has defaults matching the hosted
    /// OpenAI endpoint.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY is not set")?;

        let base_url = match env::var("OPENAI_BASE_URL") {
            Ok(raw) => Url::parse(&raw).context("OPENAI_BASE_URL is not a valid URL")?,
            Err(_) => Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        };

        let request_timeout = match env::var("TUTOR_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .context("TUTOR_REQUEST_TIMEOUT_SECS must be an integer")?,
            ),
            Err(_) => Duration::from_secs(60),
        };

        let session = match env::var("TUTOR_STUCK_CAP") {
            Ok(raw) => SessionConfig::default()
                .stuck_cap(raw.parse::<u32>().context("TUTOR_STUCK_CAP must be an integer")?),
            Err(_) => SessionConfig::default(),
        };

        Ok(Self {
            api_key: Some(api_key),
            base_url,
            chat_model: env::var("TUTOR_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.into()),
            vision_model: env::var("TUTOR_VISION_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.into()),
            bind_addr: env::var("TUTOR_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            request_timeout,
            session,
        })
    }

    /// A client for the configured endpoint
    pub fn client(&self) -> anyhow::Result<Client> {
        Client::builder()
            .http(reqwest::Client::new())
            .base_url(self.base_url.clone())
            .api_key(self.api_key.clone())
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build the provider client")
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            request_timeout: Duration::from_secs(60),
            session: SessionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_match_the_hosted_endpoint() {
        let actual = Environment::default();
        assert_eq!(actual.base_url.as_str(), "https://api.openai.com/v1/");
        assert_eq!(actual.chat_model, "gpt-4o-mini");
        assert_eq!(actual.vision_model, "gpt-4o");
        assert_eq!(actual.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_client_builds_from_defaults() {
        let environment = Environment::default().api_key("test-key".to_string());
        assert!(environment.client().is_ok());
    }
}

//! OpenAI-compatible chat-completions backend.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::MatcherConfig;
use crate::error::{EngineError, EngineResult};

use super::CompletionBackend;

/// API credential for the matching backend, read once at startup.
#[derive(Clone)]
pub struct MatcherCredentials {
    api_key: String,
}

impl MatcherCredentials {
    /// Wraps an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Reads the API key from an environment variable.
    ///
    /// Returns `MissingCredential` if the variable is unset or blank.
    pub fn from_env(var: &str) -> EngineResult<Self> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(EngineError::MissingCredential {
                var: var.to_string(),
            }),
        }
    }
}

impl fmt::Debug for MatcherCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Sends each prompt as a single system message to `{base_url}/chat/completions`.
///
/// Calls are blocking and never retried; any transport or protocol failure is
/// reported as `MatchingService`.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    model: String,
    credentials: MatcherCredentials,
}

impl OpenAiBackend {
    /// Creates a backend from the matcher settings and credential.
    pub fn new(config: &MatcherConfig, credentials: MatcherCredentials) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::matching(format!("failed to build HTTP client: {e}")))?;

        info!(url = %config.base_url, model = %config.model, "Using chat-completions matcher");

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            credentials,
        })
    }
}

impl CompletionBackend for OpenAiBackend {
    fn complete(&self, prompt: &str) -> EngineResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.api_key)
            .json(&request)
            .send()
            .map_err(|e| EngineError::matching(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            warn!(status = %status, "Matcher API returned an error");
            return Err(EngineError::matching(format!("API error {status}: {body}")));
        }

        let chat_response: ChatResponse = response
            .json()
            .map_err(|e| EngineError::matching(format!("malformed API response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| EngineError::matching("empty response from API"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn backend_for(server: &MockServer) -> OpenAiBackend {
        let config = MatcherConfig {
            base_url: format!("{}/v1/", server.base_url()),
            model: "test-model".to_string(),
            timeout_secs: 5,
            ..MatcherConfig::default()
        };
        OpenAiBackend::new(&config, MatcherCredentials::new("sk-test")).unwrap()
    }

    #[test]
    fn test_reply_content_is_returned() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "choices": [{ "message": { "role": "assistant", "content": "2" } }]
                }));
        });

        let reply = backend_for(&server).complete("prompt text").unwrap();

        mock.assert();
        assert_eq!(reply, "2");
    }

    #[test]
    fn test_http_error_is_matching_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401)
                .json_body(serde_json::json!({ "error": { "message": "bad key" } }));
        });

        match backend_for(&server).complete("prompt") {
            Err(EngineError::MatchingService { message }) => {
                assert!(message.contains("401"));
                assert!(message.contains("bad key"));
            }
            other => panic!("Expected MatchingService, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_choices_is_matching_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .json_body(serde_json::json!({ "choices": [] }));
        });

        let result = backend_for(&server).complete("prompt");
        assert!(matches!(result, Err(EngineError::MatchingService { .. })));
    }

    #[test]
    fn test_missing_env_credential() {
        let result = MatcherCredentials::from_env("OLIGO_BILLING_TEST_UNSET_KEY_9F2C");
        match result {
            Err(EngineError::MissingCredential { var }) => {
                assert_eq!(var, "OLIGO_BILLING_TEST_UNSET_KEY_9F2C");
            }
            other => panic!("Expected MissingCredential, got {:?}", other),
        }
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let debug = format!("{:?}", MatcherCredentials::new("sk-secret"));
        assert!(!debug.contains("sk-secret"));
    }
}

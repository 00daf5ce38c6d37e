//! Translator client
//!
//! One Anthropic Messages API call per request. Timeouts, HTTP 429, and
//! 5xx responses are retried up to 3 attempts with linear backoff
//! (0, 2, 4 seconds); the backoff wait aborts on cancellation. Any other
//! non-2xx response is terminal.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const MAX_ATTEMPTS: u32 = 3;

pub struct TranslatorClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ApiContent>,
    #[serde(default)]
    usage: ApiUsage,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl TranslatorClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("build translator http client"),
        }
    }

    /// Sends a translation request, retrying transient failures.
    pub async fn translate(
        &self,
        token: &CancellationToken,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        let mut last_err = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let backoff = Duration::from_secs(u64::from(attempt) * 2);
                warn!(attempt = attempt + 1, backoff_secs = backoff.as_secs(), "Retrying translation");
                tokio::select! {
                    _ = token.cancelled() => return Err(Error::Cancelled),
                    _ = tokio::time::sleep(backoff) => {}
                }
            }

            match self.do_request(system_prompt, user_prompt).await {
                Ok(text) => return Ok(text),
                Err(RequestError::Terminal(e)) => return Err(e),
                Err(RequestError::Retryable(e)) => last_err = Some(e),
            }

            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }
        }

        Err(Error::Translation(format!(
            "translation failed after {} attempts: {}",
            MAX_ATTEMPTS,
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    async fn do_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> std::result::Result<String, RequestError> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens: 4096,
            system: system_prompt,
            messages: vec![ApiMessage {
                role: "user",
                content: user_prompt,
            }],
        };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // Connection failures and timeouts are worth another attempt.
                RequestError::Retryable(Error::Translation(format!("API call: {}", e)))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            RequestError::Retryable(Error::Translation(format!("read response: {}", e)))
        })?;

        if status.as_u16() == 429 || status.is_server_error() {
            return Err(RequestError::Retryable(Error::Translation(format!(
                "retryable error (status {}): {}",
                status, body
            ))));
        }
        if !status.is_success() {
            return Err(RequestError::Terminal(Error::Translation(format!(
                "API error (status {}): {}",
                status, body
            ))));
        }

        let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            RequestError::Terminal(Error::Translation(format!("unmarshal response: {}", e)))
        })?;

        if let Some(api_err) = parsed.error {
            return Err(RequestError::Terminal(Error::Translation(format!(
                "API error: {}: {}",
                api_err.kind, api_err.message
            ))));
        }

        if parsed.content.is_empty() {
            return Err(RequestError::Terminal(Error::Translation(
                "empty response content".into(),
            )));
        }

        let text: String = parsed
            .content
            .iter()
            .filter(|c| c.kind == "text")
            .map(|c| c.text.as_str())
            .collect();

        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Translation complete"
        );

        Ok(text.trim().to_string())
    }
}

enum RequestError {
    Retryable(Error),
    Terminal(Error),
}

/// Splits a batch response on the `|||` delimiter. Slot `i` holds the
/// trimmed i-th piece, or `None` if the model returned too few parts.
/// Surplus parts are logged and discarded.
pub fn split_batch_response(response: &str, expected: usize) -> Vec<Option<String>> {
    let parts: Vec<&str> = response.split("|||").collect();

    if parts.len() > expected {
        warn!(
            expected,
            received = parts.len(),
            "Batch response has surplus parts, discarding extras"
        );
    }

    (0..expected)
        .map(|i| parts.get(i).map(|p| p.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_batch_response_exact() {
        let slots =
            split_batch_response("Kỹ năng nâng cấp ||| Trang bị cường hóa", 2);
        assert_eq!(slots[0].as_deref(), Some("Kỹ năng nâng cấp"));
        assert_eq!(slots[1].as_deref(), Some("Trang bị cường hóa"));
    }

    #[test]
    fn test_split_batch_response_short() {
        let slots = split_batch_response("một", 3);
        assert_eq!(slots[0].as_deref(), Some("một"));
        assert_eq!(slots[1], None);
        assert_eq!(slots[2], None);
    }

    #[test]
    fn test_split_batch_response_surplus_discarded() {
        let slots = split_batch_response("a ||| b ||| c", 2);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].as_deref(), Some("a"));
        assert_eq!(slots[1].as_deref(), Some("b"));
    }
}

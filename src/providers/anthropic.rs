use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{normalize_move, MoveProvider, MoveRequest};
use crate::error::ProviderError;

const NAME: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

/// Move provider backed by the Anthropic messages API.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl AnthropicProvider {
    pub fn new(client: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        AnthropicProvider {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn body(&self, request: &MoveRequest) -> Value {
        json!({
            "model": self.model,
            "max_tokens": 10,
            "messages": [
                { "role": "user", "content": request.prompt() },
            ],
        })
    }
}

#[async_trait]
impl MoveProvider for AnthropicProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn request_move(&self, request: &MoveRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!("Requesting move from Anthropic model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|source| ProviderError::Transport { provider: NAME, source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ProviderError::Transport { provider: NAME, source })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: NAME,
                status: status.as_u16(),
                body: text,
            });
        }

        extract_move(&text)
    }
}

fn extract_move(body: &str) -> Result<String, ProviderError> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
            provider: NAME,
            reason: e.to_string(),
        })?;

    let mv = parsed
        .content
        .first()
        .map(|block| normalize_move(&block.text))
        .unwrap_or_default();

    if mv.is_empty() {
        return Err(ProviderError::Empty { provider: NAME });
    }
    Ok(mv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_text_block() {
        let body = r#"{"content":[{"type":"text","text":"e5\n"}],"role":"assistant"}"#;
        assert_eq!(extract_move(body).unwrap(), "e5");
    }

    #[test]
    fn empty_content_is_an_error() {
        assert!(matches!(
            extract_move(r#"{"content":[]}"#).unwrap_err(),
            ProviderError::Empty { .. }
        ));
        assert!(matches!(
            extract_move(r#"{"content":[{"type":"text","text":""}]}"#).unwrap_err(),
            ProviderError::Empty { .. }
        ));
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            extract_move("<html>").unwrap_err(),
            ProviderError::Malformed { .. }
        ));
    }

    #[test]
    fn request_body_is_a_single_user_message() {
        let provider = AnthropicProvider::new(
            reqwest::Client::new(),
            "key".to_string(),
            "claude-3-opus-20240229".to_string(),
            "https://api.anthropic.com".to_string(),
        );
        let request = MoveRequest {
            is_retry: true,
            rejected_move: Some("Ke9".to_string()),
            ..MoveRequest::first("fen", &[])
        };
        let body = provider.body(&request);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("'Ke9' was invalid"));
    }
}

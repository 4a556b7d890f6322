use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

use super::{normalize_move, MoveProvider, MoveRequest, SYSTEM_PROMPT};
use crate::error::ProviderError;

const NAME: &str = "openai";

/// Move provider backed by the OpenAI chat completions API.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        OpenAiProvider {
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
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": request.prompt() },
            ],
        })
    }
}

#[async_trait]
impl MoveProvider for OpenAiProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn request_move(&self, request: &MoveRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!("Requesting move from OpenAI model {}", self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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
    let value: Value = serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
        provider: NAME,
        reason: e.to_string(),
    })?;

    let content = value["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ProviderError::Malformed {
            provider: NAME,
            reason: "no message content in first choice".to_string(),
        })?;

    let mv = normalize_move(content);
    if mv.is_empty() {
        return Err(ProviderError::Empty { provider: NAME });
    }
    Ok(mv)
}

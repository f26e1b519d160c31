use crate::config::UpstreamConfig;
use crate::core::prompts::SYSTEM_PROMPT;
use crate::domain::ports::{Generation, TextGenerator};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Client for a Messages-style text generation endpoint.
pub struct MessagesClient {
    client: Client,
    endpoint: String,
    model: String,
    api_version: String,
    api_key: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

impl MessagesClient {
    pub fn new(config: &UpstreamConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            api_key,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GatewayError::MissingConfigError {
                field: "upstream.api_key".to_string(),
            })?;
        Ok(Self::new(config, api_key))
    }
}

#[async_trait]
impl TextGenerator for MessagesClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<Generation> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            system: SYSTEM_PROMPT,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            max_tokens,
            "Calling upstream"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Upstream response status: {}", status);

        if !status.is_success() {
            let body = response.text().await?;
            return Err(GatewayError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(Generation {
            text,
            usage: parsed.usage,
        })
    }
}

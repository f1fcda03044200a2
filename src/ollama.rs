//! Minimal blocking client for a local Ollama server

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{RatescoutError, Result};

/// Slack on top of the call budget before the HTTP layer gives up by itself
const HTTP_GRACE: Duration = Duration::from_millis(500);

/// Timeout for cheap control requests such as listing models
const CONTROL_TIMEOUT: Duration = Duration::from_secs(5);

/// A chat-style completion backend: one user prompt in, one completion out
pub trait ChatModel: Send + Sync {
    fn chat(&self, prompt: &str) -> Result<String>;
}

/// Generation options sent with every request
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub num_ctx: u32,
    pub num_predict: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
    options: &'a GenerationOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    // `model` carries the full tag, e.g. "qwen3:4b"
    model: String,
}

pub struct OllamaClient {
    chat_agent: ureq::Agent,
    control_agent: ureq::Agent,
    host: String,
    model: String,
    options: GenerationOptions,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            chat_agent: agent_with_timeout(config.timeout().saturating_add(HTTP_GRACE)),
            control_agent: agent_with_timeout(CONTROL_TIMEOUT),
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            options: GenerationOptions {
                temperature: config.temperature,
                num_ctx: config.num_ctx,
                num_predict: config.num_predict,
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Tags of every model installed on the server
    pub fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.host);
        let mut response = self.control_agent.get(&url).call()?;
        let tags: TagsResponse = response.body_mut().read_json()?;
        Ok(tags.models.into_iter().map(|m| m.model).collect())
    }

    /// Fail unless the configured model is installed
    pub fn ensure_model(&self) -> Result<()> {
        let installed = self.list_models()?;
        debug!(model = %self.model, installed = installed.len(), "checking model");
        if installed.iter().any(|m| m == &self.model) {
            Ok(())
        } else {
            Err(RatescoutError::ModelUnavailable(self.model.clone()))
        }
    }
}

impl ChatModel for OllamaClient {
    fn chat(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.host);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: &self.options,
        };

        let mut response = self.chat_agent.post(&url).send_json(&request)?;
        let chat: ChatResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| RatescoutError::ModelFailed(format!("Unreadable chat response: {}", e)))?;
        Ok(chat.message.content)
    }
}

fn agent_with_timeout(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

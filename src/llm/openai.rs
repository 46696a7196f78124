//! OpenAI client implementation
//!
//! Async HTTP client for OpenAI-compatible `/chat/completions` endpoints with
//! function calling and image inputs.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

use crate::core::config::API_KEY_ENV;
use crate::core::{Config, Message, OperatorError, Result, ToolCall, ToolDefinition};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

/// Chat completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Request message format
#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: OpenAIContent,
}

/// Plain text, or text plus images
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OpenAIContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// Chat completions response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    function: ResponseFunction,
}

/// Function in a tool call; arguments arrive as a JSON-encoded string
#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAIClient {
    /// Create a client from configuration, reading the key from the environment
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        let client = Client::builder()
            .timeout(Duration::from_secs(config.openai.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.chat_completions_url(),
            api_key,
        })
    }

    /// Create a client for a custom base URL
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        let base_url = base_url.into();

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    /// Convert internal Message to the request format
    fn to_openai_message(msg: &Message) -> OpenAIMessage {
        let content = if msg.images.is_empty() {
            OpenAIContent::Text(msg.content.clone())
        } else {
            let mut parts = vec![ContentPart::Text {
                text: msg.content.clone(),
            }];
            parts.extend(msg.images.iter().map(|img| ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:image/png;base64,{}", img),
                },
            }));
            OpenAIContent::Parts(parts)
        };

        OpenAIMessage {
            role: msg.role.clone(),
            content,
        }
    }

    /// Convert the API response to LLMResponse
    fn to_llm_response(response: ChatResponse) -> Result<LLMResponse> {
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| OperatorError::llm("Response contained no choices"))?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let arguments = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or_else(|_| serde_json::json!({}));
                ToolCall::new(tc.function.name, arguments)
            })
            .collect();

        Ok(LLMResponse {
            content: message.content.unwrap_or_default(),
            tool_calls,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: response.model,
        })
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<LLMResponse> {
        let request_json = serde_json::to_string(request)?;
        debug!(endpoint = %self.endpoint, request = %truncate(&request_json), "chat request");

        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                OperatorError::llm(format!("Cannot connect to {}", self.endpoint))
            } else if e.is_timeout() {
                OperatorError::llm("Request to the model timed out")
            } else {
                OperatorError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            return Err(match status {
                StatusCode::UNAUTHORIZED => OperatorError::llm(format!(
                    "Authentication failed; check {}",
                    API_KEY_ENV
                )),
                StatusCode::NOT_FOUND => OperatorError::ModelNotFound(request.model.to_string()),
                _ => OperatorError::llm(format!("API error ({}): {}", status, error_text)),
            });
        }

        let response_text = response.text().await?;
        debug!(response = %truncate(&response_text), "chat response");

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| OperatorError::llm(format!("Failed to parse response: {}", e)))?;

        Self::to_llm_response(chat_response)
    }

    fn build_request<'a>(
        model: &'a str,
        messages: &[Message],
        tools: Option<&'a [ToolDefinition]>,
        options: Option<GenerateOptions>,
    ) -> ChatRequest<'a> {
        let options = options.unwrap_or_default();
        ChatRequest {
            model,
            messages: messages.iter().map(Self::to_openai_message).collect(),
            tools,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: options.stop,
        }
    }
}

fn truncate(s: &str) -> String {
    if s.chars().count() > 500 {
        format!("{}...", s.chars().take(500).collect::<String>())
    } else {
        s.to_string()
    }
}

#[async_trait]
impl LLMProvider for OpenAIClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = Self::build_request(model, messages, None, options);
        self.send(&request).await
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let tools = if tools.is_empty() { None } else { Some(tools) };
        let request = Self::build_request(model, messages, tools, options);
        self.send(&request).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

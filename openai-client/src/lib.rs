//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for chat completion. Returns the reply
//! text together with token usage so callers can account for cost. Provides
//! token masking for safe logging.

mod pricing;

use async_openai::{types::CreateChatCompletionRequestArgs, Client};
use std::sync::Arc;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
    ImageUrlArgs,
};
pub use pricing::{ModelRate, PriceTable};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        let head_len = 7.min(len);
        let tail_len = 4.min(len.saturating_sub(head_len));
        let head = &token[..head_len];
        let tail = if tail_len > 0 {
            &token[len - tail_len..]
        } else {
            ""
        };
        format!("{}***{}", head, tail)
    }
}

/// A finished completion: reply text plus the token usage the API reported.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// OpenAI chat client. Wraps the async-openai client; optionally holds the API key for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    /// API key stored only for logging (masked). None when created via `with_client()`.
    api_key_for_logging: Option<String>,
}

impl OpenAIClient {
    /// Builds a client using the given API key and default API base URL.
    pub fn new(api_key: String) -> Self {
        let api_key_for_logging = Some(api_key.clone());
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);
        Self {
            client: Arc::new(client),
            api_key_for_logging,
        }
    }

    /// Builds a client with a custom base URL (e.g. for proxies or compatible endpoints).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let api_key_for_logging = Some(api_key.clone());
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        let client = Client::with_config(config);
        Self {
            client: Arc::new(client),
            api_key_for_logging,
        }
    }

    /// Builds a client from an existing async-openai client (no API key stored for logging).
    pub fn with_client(client: Client<async_openai::config::OpenAIConfig>) -> Self {
        Self {
            client: Arc::new(client),
            api_key_for_logging: None,
        }
    }

    /// Sends one chat completion request and returns the reply with usage.
    ///
    /// Logs the masked API key and reported usage. Errors if the response has
    /// no choices; missing usage is treated as zero tokens. No retries.
    pub async fn respond(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> anyhow::Result<Completion> {
        let masked = self
            .api_key_for_logging
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "***".to_string());

        tracing::info!(
            model = %model,
            message_count = messages.len(),
            api_key = %masked,
            "OpenAI completion request"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let (input_tokens, output_tokens) = match response.usage {
            Some(ref u) => {
                tracing::info!(
                    prompt_tokens = u.prompt_tokens,
                    completion_tokens = u.completion_tokens,
                    total_tokens = u.total_tokens,
                    "OpenAI completion usage"
                );
                (u.prompt_tokens, u.completion_tokens)
            }
            None => (0, 0),
        };

        let Some(choice) = response.choices.first() else {
            anyhow::bail!("No response from OpenAI");
        };

        Ok(Completion {
            text: choice.message.content.clone().unwrap_or_default().trim().to_string(),
            input_tokens,
            output_tokens,
        })
    }
}

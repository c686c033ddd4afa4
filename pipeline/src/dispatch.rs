//! Model dispatch: system preamble, completion call, and cost attribution.

use crate::context::ChatTurn;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use gbot_core::{GbotError, Result};
use history::{Content, ContentPart, Role};
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
    Completion, ImageUrlArgs, OpenAIClient, PriceTable,
};
use std::sync::Arc;
use tracing::instrument;

/// Seam to the completion API; swapped for a scripted fake in tests.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> anyhow::Result<Completion>;
}

#[async_trait]
impl CompletionBackend for OpenAIClient {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> anyhow::Result<Completion> {
        self.respond(model, messages).await
    }
}

/// Reply text plus the token and cost figures for accounting, input and
/// output kept separate.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub input_cost: f64,
    pub output_cost: f64,
}

/// Sends assembled contexts to one statically chosen model, prepending the
/// fixed system preamble. No retries: any transport or API failure propagates
/// as [`GbotError::Dispatch`].
pub struct Dispatcher {
    backend: Arc<dyn CompletionBackend>,
    prices: PriceTable,
    model: String,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        prices: PriceTable,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            prices,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, turns))]
    pub async fn dispatch(
        &self,
        turns: &[ChatTurn],
        first_name: &str,
        now: DateTime<Local>,
    ) -> Result<DispatchOutcome> {
        let mut messages = vec![system_message(&system_preamble(first_name, now))
            .map_err(|e| GbotError::Dispatch(e.to_string()))?];
        for turn in turns {
            messages.push(to_api_message(turn).map_err(|e| GbotError::Dispatch(e.to_string()))?);
        }

        let completion = self
            .backend
            .complete(&self.model, messages)
            .await
            .map_err(|e| GbotError::Dispatch(e.to_string()))?;

        Ok(DispatchOutcome {
            input_cost: self.prices.input_cost(&self.model, completion.input_tokens),
            output_cost: self
                .prices
                .output_cost(&self.model, completion.output_tokens),
            text: completion.text,
            input_tokens: completion.input_tokens,
            output_tokens: completion.output_tokens,
        })
    }
}

/// The fixed system preamble: assistant behavior, audience locale, the user's
/// name, the current date/time, and the Telegram-HTML output contract.
fn system_preamble(first_name: &str, now: DateTime<Local>) -> String {
    format!(
        "You are a helpful assistant. \
         Our major users talk in Uzbek/Russian. \
         Most of them, most probably, are Muslim. \
         User first name is {}. \
         Current date (tell this if user asks): {}. \
         Current time (tell this if user asks): {}. \
         Return simple Telegram-compatible HTML using only <b>, <i>, <pre>, <code>, \\n, and <a>",
        first_name,
        now.format("%Y-%m-%d"),
        now.format("%I:%M %p"),
    )
}

fn system_message(content: &str) -> anyhow::Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestSystemMessageArgs::default()
        .content(content.to_string())
        .build()?
        .into())
}

/// Converts one turn to the API message shape. User turns with typed parts
/// become part arrays (text and image_url parts); everything else is flattened
/// to plain text.
fn to_api_message(turn: &ChatTurn) -> anyhow::Result<ChatCompletionRequestMessage> {
    match turn.role {
        Role::System => system_message(&turn.content.as_text()),
        Role::Assistant => Ok(ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content.as_text())
            .build()?
            .into()),
        Role::User => match &turn.content {
            Content::Text(text) => Ok(ChatCompletionRequestUserMessageArgs::default()
                .content(text.clone())
                .build()?
                .into()),
            Content::Parts(parts) => {
                let mut api_parts: Vec<ChatCompletionRequestUserMessageContentPart> = Vec::new();
                for part in parts {
                    match part {
                        ContentPart::Text { text } => api_parts.push(
                            ChatCompletionRequestMessageContentPartTextArgs::default()
                                .text(text.clone())
                                .build()?
                                .into(),
                        ),
                        ContentPart::InputImage { image_url } => api_parts.push(
                            ChatCompletionRequestMessageContentPartImageArgs::default()
                                .image_url(ImageUrlArgs::default().url(image_url.clone()).build()?)
                                .build()?
                                .into(),
                        ),
                    }
                }
                Ok(ChatCompletionRequestUserMessageArgs::default()
                    .content(api_parts)
                    .build()?
                    .into())
            }
        },
    }
}

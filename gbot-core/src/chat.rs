//! Chat-surface abstraction for sending replies and typing signals.
//!
//! [`ChatApi`] is transport-agnostic; [`TelegramChat`] implements it via teloxide.
//! Replies are Telegram HTML, passed through [`clean_telegram_html`] first.

use crate::error::{GbotError, Result};
use crate::types::Chat;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, MessageId, ParseMode, ReplyParameters};

/// Abstraction for the chat surface: plain sends, HTML replies, and the typing action.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends an HTML reply to the given message and returns the sent message's id
    /// (history records keep it so later reply-threading lookups can find the reply).
    async fn reply_html(&self, chat: &Chat, reply_to: i64, text: &str) -> Result<i64>;
    /// Signals "typing" to the chat. The indicator expires on its own after a few seconds.
    async fn send_typing(&self, chat: &Chat) -> Result<()>;
}

/// Rewrites model HTML into the subset Telegram accepts: normalizes `<br/>`
/// variants and strips list/table/span/div tags Telegram rejects outright.
pub fn clean_telegram_html(text: &str) -> String {
    static UNSUPPORTED_TAGS: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let unsupported = UNSUPPORTED_TAGS.get_or_init(|| {
        regex::Regex::new(r"</?(ul|ol|li|span|div|table|thead|tbody|tr|td|th)[^>]*>")
            .expect("static pattern")
    });

    let text = text.replace("<br/>", "<br>").replace("<br />", "<br>");
    unsupported.replace_all(&text, "").into_owned()
}

/// Teloxide-based implementation of [`ChatApi`].
pub struct TelegramChat {
    bot: teloxide::Bot,
}

impl TelegramChat {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatApi for TelegramChat {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text)
            .await
            .map_err(|e| GbotError::Chat(e.to_string()))?;
        Ok(())
    }

    async fn reply_html(&self, chat: &Chat, reply_to: i64, text: &str) -> Result<i64> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), clean_telegram_html(text))
            .parse_mode(ParseMode::Html)
            .reply_parameters(ReplyParameters::new(MessageId(reply_to as i32)))
            .await
            .map_err(|e| GbotError::Chat(e.to_string()))?;
        Ok(sent.id.0 as i64)
    }

    async fn send_typing(&self, chat: &Chat) -> Result<()> {
        self.bot
            .send_chat_action(ChatId(chat.id), ChatAction::Typing)
            .await
            .map_err(|e| GbotError::Chat(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_telegram_html_normalizes_br() {
        assert_eq!(clean_telegram_html("a<br/>b<br />c"), "a<br>b<br>c");
    }

    #[test]
    fn test_clean_telegram_html_strips_unsupported_tags() {
        let cleaned = clean_telegram_html("<ul><li>one</li></ul><div class=\"x\">two</div>");
        assert_eq!(cleaned, "onetwo");
    }

    #[test]
    fn test_clean_telegram_html_keeps_supported_tags() {
        let text = "<b>bold</b> and <code>mono</code>";
        assert_eq!(clean_telegram_html(text), text);
    }
}

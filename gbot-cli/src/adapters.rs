//! Converters from teloxide types to core types.

use chrono::Local;
use gbot_core::{Chat, Message, MessageDirection, ToCoreMessage, ToCoreUser, User};

pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        // Telegram sends several sizes per photo; the last is the largest.
        let photo_file_id = self
            .0
            .photo()
            .and_then(|sizes| sizes.last())
            .map(|p| p.file.id.clone());

        Message {
            id: self.0.id.0 as i64,
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: format!("{:?}", self.0.chat.kind),
            },
            content: self
                .0
                .text()
                .or_else(|| self.0.caption())
                .unwrap_or("")
                .to_string(),
            message_type: if photo_file_id.is_some() { "photo" } else { "text" }.to_string(),
            photo_file_id,
            direction: MessageDirection::Incoming,
            created_at: Local::now(),
            reply_to_message_id: self.0.reply_to_message().map(|m| m.id.0 as i64),
        }
    }
}

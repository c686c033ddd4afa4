//! # gbot-core
//!
//! Core types and traits for the GPT relay bot: [`ChatApi`], [`Handler`], [`Middleware`],
//! message and user types, the error taxonomy, and tracing initialization.
//! Transport-agnostic; used by handler-chain, pipeline, middleware, and gbot-cli.

pub mod chat;
pub mod error;
pub mod logger;
pub mod types;

pub use chat::{clean_telegram_html, ChatApi, TelegramChat};
pub use error::{GbotError, HandlerError, Result};
pub use logger::init_tracing;
pub use types::{
    Chat, Handler, HandlerResponse, Message, MessageDirection, Middleware, ToCoreMessage,
    ToCoreUser, User,
};

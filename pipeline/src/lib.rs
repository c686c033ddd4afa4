//! # pipeline
//!
//! The conversation assembly and dispatch pipeline: context building (quota,
//! trailing window, reply-threading), model dispatch with cost accounting,
//! the typing presence indicator, and the per-user session registry.

mod context;
mod dispatch;
mod gpt_handler;
mod session;
mod typing;

pub use context::{
    build_context, AssembledContext, ChatTurn, ContextRequest, CONTEXT_WINDOW,
    DAILY_MESSAGE_LIMIT,
};
pub use dispatch::{CompletionBackend, DispatchOutcome, Dispatcher};
pub use gpt_handler::{GptHandler, FAILURE_REPLY, QUOTA_REPLY};
pub use session::{SessionGuard, SessionRegistry};
pub use typing::{TypingIndicator, TYPING_PERIOD};

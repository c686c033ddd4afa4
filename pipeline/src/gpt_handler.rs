//! The dispatch pipeline handler: session guard → typing indicator → context
//! assembly → model dispatch → accounting → reply.

use crate::context::{build_context, ContextRequest};
use crate::dispatch::Dispatcher;
use crate::session::SessionRegistry;
use crate::typing::TypingIndicator;
use async_trait::async_trait;
use gbot_core::{
    ChatApi, GbotError, Handler, HandlerError, HandlerResponse, Message, Result,
};
use history::{Content, HistoryRecord, HistoryStore, Role};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Refusal sent when the daily message quota is reached.
pub const QUOTA_REPLY: &str =
    "🛑 Kunlik limitga yetdingiz (100 ta xabar). Iltimos, ertaga yana urinib ko‘ring.";

/// Generic notice sent when the remote dispatch fails.
pub const FAILURE_REPLY: &str =
    "❌ Javob olishda xatolik yuz berdi. Iltimos, birozdan so‘ng qayta urinib ko‘ring.";

/// Relays one user message to the model and writes both sides of the exchange
/// back into the history store. At most one pipeline runs per user; while the
/// remote call is in flight a typing indicator signals the chat.
pub struct GptHandler {
    chat_api: Arc<dyn ChatApi>,
    history: HistoryStore,
    dispatcher: Dispatcher,
    sessions: SessionRegistry,
}

impl GptHandler {
    pub fn new(
        chat_api: Arc<dyn ChatApi>,
        history: HistoryStore,
        dispatcher: Dispatcher,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            chat_api,
            history,
            dispatcher,
            sessions,
        }
    }

    /// Runs the pipeline for a message carrying an already-uploaded image.
    /// The photo relay calls this after the upload endpoint returns the URL.
    pub async fn handle_image(&self, message: &Message, image_url: &str) -> Result<HandlerResponse> {
        self.converse(message, Some(image_url)).await
    }

    /// Full pipeline for one message. The session guard and the typing
    /// indicator are both released on every exit path: the guard by drop, the
    /// indicator by the explicit stop below (drop covers early returns).
    #[instrument(skip(self, message, image_url), fields(user_id = message.user.id))]
    async fn converse(&self, message: &Message, image_url: Option<&str>) -> Result<HandlerResponse> {
        let user_id = message.user.id;

        let _session = match self.sessions.acquire(user_id) {
            Ok(guard) => guard,
            Err(_) => {
                // SessionBusy: drop the message silently, per the
                // single-pipeline-per-user rule. No reply, no history write.
                debug!(user_id = user_id, "Dispatch already in flight, dropping message");
                return Ok(HandlerResponse::Stop);
            }
        };

        let typing = TypingIndicator::start(self.chat_api.clone(), message.chat.clone());
        let result = self.run_dispatch(message, image_url).await;
        typing.stop();

        match result {
            Ok(reply) => Ok(HandlerResponse::Reply(reply)),
            Err(GbotError::Handler(HandlerError::DailyQuotaExceeded)) => {
                info!(user_id = user_id, "Daily quota exceeded, refusing dispatch");
                self.chat_api
                    .reply_html(&message.chat, message.id, QUOTA_REPLY)
                    .await?;
                Ok(HandlerResponse::Stop)
            }
            Err(e) => {
                error!(user_id = user_id, error = %e, "Dispatch pipeline failed");
                if let Err(send_err) = self
                    .chat_api
                    .reply_html(&message.chat, message.id, FAILURE_REPLY)
                    .await
                {
                    error!(user_id = user_id, error = %send_err, "Failed to deliver failure notice");
                }
                Ok(HandlerResponse::Stop)
            }
        }
    }

    async fn run_dispatch(&self, message: &Message, image_url: Option<&str>) -> Result<String> {
        let user_id = message.user.id;
        let now = message.created_at;

        let log = self.history.read_all(user_id, now);
        let request = ContextRequest {
            text: &message.content,
            image_url,
            reply_to: message.reply_to_message_id,
            now,
        };
        let context = build_context(&log, &request)?;

        let outcome = self
            .dispatcher
            .dispatch(&context.turns, &message.user.display_name(), now)
            .await?;

        // Input tokens/cost go to the first new turn only; a text+image split
        // writes zeroes on the rest so nothing is counted twice.
        for (i, turn) in context.new_turns().iter().enumerate() {
            let (tokens, price) = if i == 0 {
                (outcome.input_tokens, outcome.input_cost)
            } else {
                (0, 0.0)
            };
            let record = HistoryRecord::new(
                Role::User,
                turn.content.clone(),
                Some(message.id),
                self.dispatcher.model(),
                tokens,
                price,
                now,
            );
            self.history
                .append(user_id, record, now)
                .map_err(|e| GbotError::History(e.to_string()))?;
        }

        let reply_id = self
            .chat_api
            .reply_html(&message.chat, message.id, &outcome.text)
            .await?;

        let record = HistoryRecord::new(
            Role::Assistant,
            Content::text(outcome.text.clone()),
            Some(reply_id),
            self.dispatcher.model(),
            outcome.output_tokens,
            outcome.output_cost,
            now,
        );
        self.history
            .append(user_id, record, now)
            .map_err(|e| GbotError::History(e.to_string()))?;

        info!(
            user_id = user_id,
            input_tokens = outcome.input_tokens,
            output_tokens = outcome.output_tokens,
            "Dispatch complete"
        );

        Ok(outcome.text)
    }
}

#[async_trait]
impl Handler for GptHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.message_type != "text" {
            return Ok(HandlerResponse::Ignore);
        }
        self.converse(message, None).await
    }
}

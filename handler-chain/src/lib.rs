//! # Handler chain
//!
//! Runs registered middleware and handlers for each incoming message. Middleware `before`
//! hooks run in order and can stop the chain; handlers run until one returns Stop or Reply;
//! middleware `after` hooks then run in reverse order with the final response.

use gbot_core::{Handler, HandlerResponse, Message, Middleware, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chain of middleware and handlers for one bot.
#[derive(Clone)]
pub struct HandlerChain {
    middleware: Vec<Arc<dyn Middleware>>,
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain (no middleware, no handlers).
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Appends a middleware (before runs in order, after in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a handler (first Stop/Reply ends the handler phase).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Runs the chain for one message and returns the final response.
    #[instrument(skip(self, message))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let mut final_response = HandlerResponse::Continue;

        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_id = message.id,
            "step: handler_chain started"
        );

        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            if !mw.before(message).await? {
                info!(
                    user_id = message.user.id,
                    middleware = %mw_name,
                    "step: middleware before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
            debug!(
                user_id = message.user.id,
                middleware = %mw_name,
                "step: middleware before done"
            );
        }

        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            let response = handler.handle(message).await?;
            debug!(
                user_id = message.user.id,
                handler = %handler_name,
                response = ?response,
                "step: handler done"
            );

            match response {
                HandlerResponse::Stop | HandlerResponse::Reply(_) => {
                    info!(
                        user_id = message.user.id,
                        handler = %handler_name,
                        "step: handler chain stopped by handler"
                    );
                    final_response = response;
                    break;
                }
                HandlerResponse::Continue | HandlerResponse::Ignore => continue,
            }
        }

        // after hooks run in reverse order (last added runs first).
        for mw in self.middleware.iter().rev() {
            mw.after(message, &final_response).await?;
        }

        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_id = message.id,
            "step: handler_chain finished"
        );

        Ok(final_response)
    }
}

impl Default for HandlerChain {
    fn default() -> Self {
        Self::new()
    }
}

// Tests live in tests/handler_chain_test.rs

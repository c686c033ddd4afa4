use async_trait::async_trait;
use gbot_core::{HandlerResponse, Message, Middleware, Result};
use tracing::{debug, info, instrument};

pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            user_id = message.user.id,
            username = %message.user.username.as_deref().unwrap_or("unknown"),
            message_type = %message.message_type,
            message_content = %message.content,
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        debug!(
            message_id = message.id,
            response = ?response,
            "Processed message"
        );
        Ok(())
    }
}

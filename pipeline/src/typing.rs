//! Presence indicator: signals "typing" on a fixed cadence while a dispatch runs.

use gbot_core::{Chat, ChatApi};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// Telegram drops the indicator after a few seconds, so it is re-sent every period.
pub const TYPING_PERIOD: Duration = Duration::from_secs(5);

/// A running typing loop. Stopping (or dropping) aborts the loop; the abort is
/// observed at the sleep point, within one period, and never surfaces as an error.
pub struct TypingIndicator {
    task: JoinHandle<()>,
}

impl TypingIndicator {
    /// Spawns the loop: send the typing action, sleep one period, repeat.
    /// A failing send ends the loop silently — presence is best-effort.
    pub fn start(chat_api: Arc<dyn ChatApi>, chat: Chat) -> Self {
        let task = tokio::spawn(async move {
            loop {
                if let Err(e) = chat_api.send_typing(&chat).await {
                    warn!(chat_id = chat.id, error = %e, "Typing signal failed, stopping indicator");
                    break;
                }
                tokio::time::sleep(TYPING_PERIOD).await;
            }
        });
        Self { task }
    }

    /// Stops the indicator. Equivalent to dropping it; named for call sites
    /// where the stop is a deliberate pipeline step.
    pub fn stop(self) {}
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

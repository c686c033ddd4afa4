//! Context assembly: quota check, trailing window, reply-thread injection, new turn(s).

use chrono::{DateTime, Local};
use gbot_core::HandlerError;
use history::{Content, HistoryRecord, Role};

/// How many trailing history records go to the model as base context.
pub const CONTEXT_WINDOW: usize = 60;

/// How many user messages one user may send per calendar day.
pub const DAILY_MESSAGE_LIMIT: usize = 100;

/// One role-tagged content unit sent to the model; history metadata stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: Content,
}

impl ChatTurn {
    fn of(record: &HistoryRecord) -> Self {
        Self {
            role: record.role,
            content: record.content.clone(),
        }
    }
}

/// What the incoming message contributes to the context.
#[derive(Debug, Clone)]
pub struct ContextRequest<'a> {
    /// User-supplied text (possibly empty, e.g. a photo without caption).
    pub text: &'a str,
    /// Image reference for multimodal turns.
    pub image_url: Option<&'a str>,
    /// Message id the user is replying to, if any.
    pub reply_to: Option<i64>,
    pub now: DateTime<Local>,
}

/// Assembled context: trailing window ⊕ reply-thread records ⊕ new turn(s).
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub turns: Vec<ChatTurn>,
    /// How many turns at the tail are the new message. The accounting writer
    /// attributes input tokens/cost to the first of these only.
    pub new_turn_count: usize,
}

impl AssembledContext {
    /// The new-message turns (the tail of `turns`).
    pub fn new_turns(&self) -> &[ChatTurn] {
        &self.turns[self.turns.len() - self.new_turn_count..]
    }
}

/// Builds the ordered turn list for one dispatch from the user's monthly log.
///
/// Refuses with [`HandlerError::DailyQuotaExceeded`] when the user already sent
/// [`DAILY_MESSAGE_LIMIT`] messages on the calendar day of `request.now`.
pub fn build_context(
    log: &[HistoryRecord],
    request: &ContextRequest<'_>,
) -> Result<AssembledContext, HandlerError> {
    let today = request.now.date_naive();
    let sent_today = log
        .iter()
        .filter(|r| r.role == Role::User && r.timestamp.date_naive() == today)
        .count();
    if sent_today >= DAILY_MESSAGE_LIMIT {
        return Err(HandlerError::DailyQuotaExceeded);
    }

    let start = log.len().saturating_sub(CONTEXT_WINDOW);
    let mut turns: Vec<ChatTurn> = log[start..].iter().map(ChatTurn::of).collect();

    // Reply-threading: the first record carrying the replied-to id, and the
    // immediately following record when it shares that id (a user/assistant
    // exchange stored under one surface message id). At most two records.
    if let Some(reply_to) = request.reply_to {
        if let Some(i) = log.iter().position(|r| r.message_id == Some(reply_to)) {
            turns.push(ChatTurn::of(&log[i]));
            if let Some(next) = log.get(i + 1) {
                if next.message_id == Some(reply_to) {
                    turns.push(ChatTurn::of(next));
                }
            }
        }
    }

    let mut new_turn_count = 0;
    if let Some(image_url) = request.image_url {
        if !request.text.is_empty() {
            turns.push(ChatTurn {
                role: Role::User,
                content: Content::text(request.text),
            });
            new_turn_count += 1;
        }
        turns.push(ChatTurn {
            role: Role::User,
            content: Content::image(image_url),
        });
        new_turn_count += 1;
    } else {
        turns.push(ChatTurn {
            role: Role::User,
            content: Content::text(request.text),
        });
        new_turn_count += 1;
    }

    Ok(AssembledContext {
        turns,
        new_turn_count,
    })
}

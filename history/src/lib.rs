//! # history
//!
//! Persistence for per-user conversation history: one append-only JSON log per
//! (user, calendar month), plus the monthly usage aggregation behind /profile.

mod error;
mod record;
mod store;

pub use error::HistoryError;
pub use record::{Content, ContentPart, HistoryRecord, Role};
pub use store::{HistoryStore, MonthlyUsage};

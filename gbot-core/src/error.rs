use thiserror::Error;

#[derive(Error, Debug)]
pub enum GbotError {
    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("History error: {0}")]
    History(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Daily message quota exceeded")]
    DailyQuotaExceeded,

    #[error("A dispatch is already in flight for this user")]
    SessionBusy,
}

pub type Result<T> = std::result::Result<T, GbotError>;

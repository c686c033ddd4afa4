use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History file corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

use sweepbot_core::GameError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed")]
    Io(#[from] std::io::Error),
    #[error("Stored record is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("Store lock poisoned by a panicked writer")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("User already has a game running")]
    AlreadyPlaying,
    #[error("User has no game running")]
    NoActiveGame,
    #[error("User is blacklisted: {0}")]
    Blacklisted(String),
    #[error("Session lock poisoned by a panicked handler")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, SessionError>;

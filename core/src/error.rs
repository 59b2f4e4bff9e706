use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board width and height must both be at least 1")]
    InvalidSize,
    #[error("A game needs at least one mine")]
    NoMines,
    #[error("Too many mines, at most {max} fit on this board")]
    TooManyMines { max: u16 },
    #[error("Start cell cannot hold a mine")]
    UnsafeStart,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Game>;
}

/// How the first click is protected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartTile {
    /// No designated start cell, the first click can hit a mine.
    None,
    /// A start cell is marked and never holds a mine.
    Safe,
    /// The start cell and all of its neighbors are free of mines.
    Clear,
}

impl StartTile {
    /// Whether `pos` must stay free of mines for a start cell at `start`.
    pub fn excludes(self, start: Coord2, pos: Coord2) -> bool {
        match self {
            Self::None => false,
            Self::Safe => pos == start,
            Self::Clear => start.0.abs_diff(pos.0) <= 1 && start.1.abs_diff(pos.1) <= 1,
        }
    }
}

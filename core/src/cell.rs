use serde::{Deserialize, Serialize};

use crate::Coord2;

/// What a cell really is, fixed when the board is generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Mine,
}

/// What the player currently sees on a cell.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Revealed,
    Flagged,
    /// Designated first click, guaranteed not to be a mine.
    SafeStart,
    ExplodedMine,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) pos: Coord2,
    pub(crate) kind: CellKind,
    pub(crate) state: CellState,
    pub(crate) adjacent_mines: u8,
}

impl Cell {
    pub(crate) const fn new(pos: Coord2, kind: CellKind) -> Self {
        Self {
            pos,
            kind,
            state: CellState::Hidden,
            adjacent_mines: 0,
        }
    }

    pub const fn pos(&self) -> Coord2 {
        self.pos
    }

    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    pub const fn state(&self) -> CellState {
        self.state
    }

    /// Mines among the neighbors, what a revealed cell displays.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub const fn is_mine(&self) -> bool {
        matches!(self.kind, CellKind::Mine)
    }

    /// Not yet opened and not flagged, so a reveal would act on it.
    pub const fn is_hidden(&self) -> bool {
        matches!(self.state, CellState::Hidden | CellState::SafeStart)
    }

    pub const fn is_revealed(&self) -> bool {
        matches!(self.state, CellState::Revealed)
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.state, CellState::Flagged)
    }
}

use serde::{Deserialize, Serialize};

use crate::*;

/// Preset boards offered to players, plus the free-form custom mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Custom {
        mines: CellCount,
        allow_mines_near_start: bool,
        no_start_cell: bool,
    },
}

impl Difficulty {
    pub const BOARD_SIZE: Coord2 = (5, 5);

    pub const RANKED: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Key used for stats and leaderboards.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Custom { .. } => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::RANKED
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(name))
    }

    /// Custom games never count towards stats or leaderboards.
    pub const fn is_ranked(self) -> bool {
        !matches!(self, Self::Custom { .. })
    }

    pub const fn start_tile(self) -> StartTile {
        match self {
            Self::Custom {
                no_start_cell: true,
                ..
            } => StartTile::None,
            Self::Custom {
                allow_mines_near_start: true,
                ..
            } => StartTile::Safe,
            _ => StartTile::Clear,
        }
    }

    /// Mine count actually used, custom requests are clamped to the board.
    pub const fn mines(self) -> CellCount {
        match self {
            Self::Easy => 5,
            Self::Medium => 7,
            Self::Hard => 9,
            Self::Custom { mines, .. } => {
                let max = area(Self::BOARD_SIZE) - 1;
                if mines < 1 {
                    1
                } else if mines > max {
                    max
                } else {
                    mines
                }
            }
        }
    }

    pub fn config(self) -> Result<GameConfig> {
        GameConfig::new(Self::BOARD_SIZE, self.mines(), self.start_tile())
    }
}

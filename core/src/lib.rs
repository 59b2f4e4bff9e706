#![no_std]

extern crate alloc;

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use achievement::*;
pub use cell::*;
pub use difficulty::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use outcome::*;
pub use types::*;

mod achievement;
mod cell;
mod difficulty;
mod engine;
mod error;
mod generator;
mod outcome;
mod types;

/// Validated parameters for a new board. Only [`GameConfig::new`] builds one,
/// deserializing goes through it too.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig")]
pub struct GameConfig {
    size: Coord2,
    mines: CellCount,
    start: StartTile,
}

#[derive(Deserialize)]
struct RawGameConfig {
    size: Coord2,
    mines: CellCount,
    start: StartTile,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = GameError;

    fn try_from(raw: RawGameConfig) -> Result<Self> {
        Self::new(raw.size, raw.mines, raw.start)
    }
}

impl GameConfig {
    /// Rejects boards that could not be generated. The exclusion zone of
    /// [`StartTile::Clear`] is sized for a start cell away from the edges, so a
    /// config accepted here always fits wherever the start cell lands.
    pub fn new(size: Coord2, mines: CellCount, start: StartTile) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidSize);
        }
        if mines == 0 {
            return Err(GameError::NoMines);
        }
        let max = Self::max_mines(size, start);
        if mines > max {
            log::warn!("rejected {} mines on a {:?} board, max is {}", mines, size, max);
            return Err(GameError::TooManyMines { max });
        }
        Ok(Self { size, mines, start })
    }

    /// Most mines a board of `size` takes while keeping at least one safe cell
    /// and the start exclusion zone clear.
    pub const fn max_mines(size: Coord2, start: StartTile) -> CellCount {
        let reserved = match start {
            StartTile::None | StartTile::Safe => 1,
            StartTile::Clear => max_neighborhood(size),
        };
        area(size).saturating_sub(reserved)
    }

    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn start(&self) -> StartTile {
        self.start
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.size)
    }
}

/// Where the mines are, independent of anything the player did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub(crate) fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    /// Builds a layout from explicit mine positions, duplicates count once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidSize);
        }
        let mut mine_mask: Array2<bool> = Array2::default(size.grid_index());
        for &pos in mine_coords {
            if !in_bounds(pos, size) {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[pos.grid_index()] = true;
        }
        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.mine_mask.dim();
        (width as Coord, height as Coord)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        area(self.size()) - self.mine_count
    }

    pub fn contains_mine(&self, pos: Coord2) -> bool {
        self[pos]
    }

    pub fn adjacent_mine_count(&self, pos: Coord2) -> u8 {
        NeighborIter::new(pos, self.size())
            .filter(|&neighbor| self[neighbor])
            .count() as u8
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, pos: Coord2) -> &Self::Output {
        &self.mine_mask[pos.grid_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_empty_board() {
        assert_eq!(
            GameConfig::new((0, 5), 1, StartTile::None),
            Err(GameError::InvalidSize)
        );
        assert_eq!(GameConfig::new((5, 5), 0, StartTile::None), Err(GameError::NoMines));
    }

    #[test]
    fn config_reserves_start_zone() {
        assert!(GameConfig::new((5, 5), 24, StartTile::None).is_ok());
        assert!(GameConfig::new((5, 5), 24, StartTile::Safe).is_ok());
        assert_eq!(
            GameConfig::new((5, 5), 25, StartTile::None),
            Err(GameError::TooManyMines { max: 24 })
        );
        assert!(GameConfig::new((5, 5), 16, StartTile::Clear).is_ok());
        assert_eq!(
            GameConfig::new((5, 5), 17, StartTile::Clear),
            Err(GameError::TooManyMines { max: 16 })
        );
    }

    #[test]
    fn deserializing_validates() {
        let config: GameConfig =
            serde_json::from_str(r#"{"size":[5,5],"mines":16,"start":"Clear"}"#).unwrap();
        assert_eq!(config.mines(), 16);
        assert_eq!(config.start(), StartTile::Clear);

        let too_many = serde_json::from_str::<GameConfig>(
            r#"{"size":[5,5],"mines":20,"start":"Clear"}"#,
        );
        assert!(too_many.is_err());
        let empty = serde_json::from_str::<GameConfig>(r#"{"size":[0,5],"mines":1,"start":"Safe"}"#);
        assert!(empty.is_err());
    }

    #[test]
    fn serialized_config_reads_back() {
        let config = GameConfig::new((4, 3), 2, StartTile::Safe).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<GameConfig>(&json).unwrap(), config);
    }

    #[test]
    fn layout_counts_adjacent_mines() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2), (0, 0)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.safe_cell_count(), 7);
        assert_eq!(layout.adjacent_mine_count((1, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((2, 0)), 0);
        assert!(layout.contains_mine((2, 2)));
    }

    #[test]
    fn layout_rejects_out_of_bounds_mine() {
        assert_eq!(
            MineLayout::from_mine_coords((3, 3), &[(3, 0)]),
            Err(GameError::InvalidCoords)
        );
    }
}

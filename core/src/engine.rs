use alloc::collections::{BTreeSet, VecDeque};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One board from creation until it is won or lost.
///
/// Nothing here is shared: callers serialize access to a game themselves and
/// drop it once [`Game::is_finished`] turns true.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    cells: Array2<Cell>,
    total_mines: CellCount,
    safe_cells_left: CellCount,
    flagged_count: CellCount,
    visited_zeros: BTreeSet<Coord2>,
    start: Option<Coord2>,
    state: GameState,
    triggered_mine: Option<Coord2>,
}

impl Game {
    /// Starts a game on a known layout, `start` is marked as the safe first
    /// click.
    pub fn new(layout: MineLayout, start: Option<Coord2>) -> Result<Self> {
        if let Some(start) = start {
            if !in_bounds(start, layout.size()) {
                return Err(GameError::InvalidCoords);
            }
            if layout.contains_mine(start) {
                return Err(GameError::UnsafeStart);
            }
        }
        if layout.safe_cell_count() == 0 {
            return Err(GameError::TooManyMines {
                max: area(layout.size()) - 1,
            });
        }
        Ok(Self::from_layout(layout, start))
    }

    pub(crate) fn from_layout(layout: MineLayout, start: Option<Coord2>) -> Self {
        let size = layout.size();
        let mut cells = Array2::from_shape_fn(size.grid_index(), |(x, y)| {
            let pos = (x as Coord, y as Coord);
            let kind = if layout.contains_mine(pos) {
                CellKind::Mine
            } else {
                CellKind::Empty
            };
            let mut cell = Cell::new(pos, kind);
            cell.adjacent_mines = layout.adjacent_mine_count(pos);
            cell
        });
        if let Some(start) = start {
            cells[start.grid_index()].state = CellState::SafeStart;
        }

        Self {
            cells,
            total_mines: layout.mine_count(),
            safe_cells_left: layout.safe_cell_count(),
            flagged_count: 0,
            visited_zeros: BTreeSet::new(),
            start,
            state: GameState::InProgress,
            triggered_mine: None,
        }
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.cells.dim();
        (width as Coord, height as Coord)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn total_mines(&self) -> CellCount {
        self.total_mines
    }

    /// Safe cells still hidden, the game is won when this reaches zero.
    pub fn safe_cells_left(&self) -> CellCount {
        self.safe_cells_left
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus flags, can go negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        self.total_mines as isize - self.flagged_count as isize
    }

    pub fn start_cell(&self) -> Option<Coord2> {
        self.start
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn find_cell(&self, pos: Coord2) -> Result<&Cell> {
        let pos = self.validate(pos)?;
        Ok(&self.cells[pos.grid_index()])
    }

    /// All cells, column by column.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn neighbors(&self, pos: Coord2) -> NeighborIter {
        NeighborIter::new(pos, self.size())
    }

    pub fn neighbor_cells(&self, pos: Coord2) -> impl Iterator<Item = &Cell> {
        self.neighbors(pos).map(|neighbor| &self.cells[neighbor.grid_index()])
    }

    pub fn count_flagged_neighbors(&self, pos: Coord2) -> u8 {
        self.neighbor_cells(pos)
            .filter(|cell| cell.is_flagged())
            .count() as u8
    }

    /// Opens a hidden cell, cascading over zero cells. Flagged and already
    /// opened cells are left alone.
    pub fn reveal(&mut self, pos: Coord2) -> Result<Outcome> {
        let pos = self.validate(pos)?;
        self.check_in_progress()?;
        Ok(self.reveal_cell(pos))
    }

    pub fn toggle_flag(&mut self, pos: Coord2) -> Result<MarkOutcome> {
        let pos = self.validate(pos)?;
        self.check_in_progress()?;

        let cell = &mut self.cells[pos.grid_index()];
        Ok(match cell.state {
            CellState::Hidden => {
                cell.state = CellState::Flagged;
                self.flagged_count += 1;
                MarkOutcome::Flagged
            }
            CellState::Flagged => {
                cell.state = CellState::Hidden;
                self.flagged_count -= 1;
                MarkOutcome::Unflagged
            }
            _ => MarkOutcome::NoChange,
        })
    }

    /// Opens every unflagged neighbor of a revealed cell, provided the number
    /// of flags around it matches its mine count. Stops at the first reveal
    /// that ends the game.
    pub fn chord(&mut self, pos: Coord2) -> Result<Outcome> {
        let pos = self.validate(pos)?;
        self.check_in_progress()?;

        let cell = self.cells[pos.grid_index()];
        if !cell.is_revealed() {
            return Ok(Outcome::Nothing);
        }

        let flags = self.count_flagged_neighbors(pos);
        if flags != cell.adjacent_mines {
            log::debug!(
                "Chord at {:?} out of tune, {} flags for {} mines",
                pos,
                flags,
                cell.adjacent_mines
            );
            return Ok(Outcome::Nothing);
        }

        for neighbor in self.neighbors(pos) {
            let outcome = self.reveal_cell(neighbor);
            if outcome.is_terminal() {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Nothing)
    }

    fn reveal_cell(&mut self, pos: Coord2) -> Outcome {
        let cell = &mut self.cells[pos.grid_index()];
        if !cell.is_hidden() {
            return Outcome::Nothing;
        }

        if cell.is_mine() {
            cell.state = CellState::ExplodedMine;
            self.triggered_mine = Some(pos);
            self.state = GameState::Lost;
            log::debug!("Mine hit at {:?}", pos);
            return Outcome::Lost;
        }

        cell.state = CellState::Revealed;
        let is_zero = cell.adjacent_mines == 0;
        self.safe_cells_left -= 1;

        if is_zero {
            self.visit_nearby_zeros(pos);
        }

        if self.safe_cells_left == 0 {
            self.state = GameState::Won;
            log::debug!("Board cleared by reveal at {:?}", pos);
            Outcome::Won
        } else {
            Outcome::Nothing
        }
    }

    /// Cascade from a freshly revealed zero cell: opens the connected zero
    /// region and the ring of numbered cells around it. Zero cells are visited
    /// at most once per game, so this terminates on any board.
    fn visit_nearby_zeros(&mut self, origin: Coord2) {
        let size = self.size();
        let mut pending = VecDeque::from([origin]);

        while let Some(zero) = pending.pop_front() {
            if !self.visited_zeros.insert(zero) {
                continue;
            }

            for neighbor in NeighborIter::new(zero, size) {
                if self.visited_zeros.contains(&neighbor) {
                    continue;
                }
                let cell = &mut self.cells[neighbor.grid_index()];
                if cell.is_mine() || !cell.is_hidden() {
                    continue;
                }

                cell.state = CellState::Revealed;
                self.safe_cells_left -= 1;
                log::trace!(
                    "Cascade opened {:?}, {} adjacent mines",
                    neighbor,
                    cell.adjacent_mines
                );

                if cell.adjacent_mines == 0 {
                    pending.push_back(neighbor);
                }
            }
        }
    }

    fn validate(&self, pos: Coord2) -> Result<Coord2> {
        if in_bounds(pos, self.size()) {
            Ok(pos)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn check_in_progress(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

use std::fmt::{self, Write as _};
use sweepbot_core::*;

/// What a cell looks like to the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ViewCell {
    Hidden,
    Start,
    Flagged,
    Misflagged,
    Revealed(u8),
    Mine,
    TriggeredMine,
}

impl ViewCell {
    /// While playing only what the player uncovered shows, once the game is
    /// over the mines and wrong flags are shown too.
    fn of(cell: &Cell, game_over: bool) -> Self {
        match (cell.state(), cell.is_mine(), game_over) {
            (CellState::ExplodedMine, ..) => Self::TriggeredMine,
            (CellState::Revealed, ..) => Self::Revealed(cell.adjacent_mines()),
            (CellState::Flagged, false, true) => Self::Misflagged,
            (CellState::Flagged, ..) => Self::Flagged,
            (_, true, true) => Self::Mine,
            (CellState::SafeStart, ..) => Self::Start,
            _ => Self::Hidden,
        }
    }
}

impl fmt::Display for ViewCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => f.write_char('#'),
            Self::Start => f.write_char('S'),
            Self::Flagged => f.write_char('F'),
            Self::Misflagged => f.write_char('x'),
            Self::Revealed(0) => f.write_char('.'),
            Self::Revealed(count) => write!(f, "{count}"),
            Self::Mine => f.write_char('*'),
            Self::TriggeredMine => f.write_char('!'),
        }
    }
}

/// Plain-text grid with column numbers on top and row numbers on the left.
pub fn render(game: &Game, game_over: bool) -> String {
    let (width, height) = game.size();
    let mut out = String::from("   ");
    for x in 0..width {
        let _ = write!(out, "{x:>2}");
    }
    out.push('\n');

    for y in 0..height {
        let _ = write!(out, "{y:>2} ");
        for x in 0..width {
            if let Ok(cell) = game.find_cell((x, y)) {
                let _ = write!(out, " {}", ViewCell::of(cell, game_over));
            }
        }
        out.push('\n');
    }
    out
}

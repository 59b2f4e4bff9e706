//! Achievement evaluation.
//!
//! An achievement is a pure predicate over a [`Snapshot`] of the action that
//! just happened and the player's [`History`]. Both are assembled by the
//! caller, so evaluation never reaches for storage and every predicate can be
//! checked in isolation. Predicates are independent of each other and of the
//! order they run in.

use alloc::collections::BTreeSet;
use bitflags::bitflags;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;
pub use catalog::*;

mod catalog;

/// Stable identifier, persisted with the player's unlocks.
pub type AchievementId = u16;

/// When, relative to the board changing, a snapshot was taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Before a reveal is applied, the clicked cell and its neighbors still
    /// show the state the player acted on.
    BeforeReveal,
    AfterAction,
}

bitflags! {
    /// Kinds of moves made so far in the current game.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Actions: u8 {
        /// Opened a cell directly, the designated start cell excluded.
        const REVEALED = 1;
        const FLAGGED  = 1 << 1;
        const CHORDED  = 1 << 2;
    }
}

/// What the player did and what it led to.
#[derive(Copy, Clone, Debug)]
pub struct Snapshot<'a> {
    pub game: &'a Game,
    pub outcome: Outcome,
    /// Cell acted upon, `None` for timeouts and abandoned games.
    pub cell: Option<Coord2>,
    pub chorded: bool,
    /// A flag was placed, removing one does not count.
    pub flagged: bool,
    /// Safe cells opened by the action.
    pub revealed: CellCount,
    pub phase: Phase,
}

impl<'a> Snapshot<'a> {
    pub fn before_reveal(game: &'a Game, cell: Coord2) -> Self {
        Self {
            game,
            outcome: Outcome::Nothing,
            cell: Some(cell),
            chorded: false,
            flagged: false,
            revealed: 0,
            phase: Phase::BeforeReveal,
        }
    }

    pub fn after_action(game: &'a Game, outcome: Outcome) -> Self {
        Self {
            game,
            outcome,
            cell: None,
            chorded: false,
            flagged: false,
            revealed: 0,
            phase: Phase::AfterAction,
        }
    }

    pub fn with_cell(self, cell: Coord2) -> Self {
        Self {
            cell: Some(cell),
            ..self
        }
    }

    pub fn with_chord(self, revealed: CellCount) -> Self {
        Self {
            chorded: true,
            revealed,
            ..self
        }
    }

    pub fn with_reveal(self, revealed: CellCount) -> Self {
        Self { revealed, ..self }
    }

    pub fn with_flag(self) -> Self {
        Self {
            flagged: true,
            ..self
        }
    }

    /// The cell acted upon, if it is on the board.
    pub fn clicked(&self) -> Option<&'a Cell> {
        self.game.find_cell(self.cell?).ok()
    }
}

/// Player data that predicates may consult, supplied by the caller.
///
/// For terminal outcomes the counters already include the game that just
/// ended.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub wins: u32,
    pub losses: u32,
    pub win_streak: u32,
    /// Moves made in the current game.
    pub actions: Actions,
    pub moves: u32,
    /// Time since the first move of the current game.
    pub elapsed: Duration,
}

#[derive(Copy, Clone, Debug)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub check: fn(&Snapshot<'_>, &History) -> bool,
}

impl Achievement {
    pub fn is_unlocked_by(&self, snapshot: &Snapshot<'_>, history: &History) -> bool {
        (self.check)(snapshot, history)
    }
}

/// Ids of every achievement in `catalog` whose predicate holds. Callers drop
/// the ones the player already has.
pub fn evaluate(
    catalog: &[Achievement],
    snapshot: &Snapshot<'_>,
    history: &History,
) -> BTreeSet<AchievementId> {
    catalog
        .iter()
        .filter(|achievement| achievement.is_unlocked_by(snapshot, history))
        .map(|achievement| achievement.id)
        .collect()
}

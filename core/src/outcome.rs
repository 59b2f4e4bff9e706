use serde::{Deserialize, Serialize};

/// Result of a reveal or chord, and the ways a session can end.
///
/// The engine only ever produces `Nothing`, `Lost` and `Won`. `ManuallyEnded`
/// and `TimedOut` are decided by whoever runs the session and exist here so
/// every consumer reads the same set of events.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The game goes on.
    #[default]
    Nothing,
    /// A mine was revealed.
    Lost,
    /// Every safe cell is revealed.
    Won,
    /// The player gave up.
    ManuallyEnded,
    /// The player went idle for too long.
    TimedOut,
}

impl Outcome {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Nothing)
    }
}

/// Result of toggling a flag, which can never end the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

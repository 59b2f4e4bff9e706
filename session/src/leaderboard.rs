use serde::{Deserialize, Serialize};

use crate::UserId;

/// Scope of the board covering every guild.
pub const GLOBAL_SCOPE: &str = "global";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    /// Winning time in seconds.
    pub time: f64,
}

/// Fastest wins for one scope and difficulty, one entry per player, fastest
/// first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Store key of the board for `scope`, a guild id or [`GLOBAL_SCOPE`].
    pub fn key(scope: &str, difficulty: &str) -> String {
        format!("{scope}:{difficulty}")
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Zero-based rank of `user_id`, if listed.
    pub fn position(&self, user_id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.user_id == user_id)
    }

    /// Enters a time and returns its zero-based rank, or `None` if it did not
    /// beat the player's listed time or fell outside the top `capacity`.
    /// Equal times keep the earlier entry ahead.
    pub fn submit(&mut self, entry: LeaderboardEntry, capacity: usize) -> Option<usize> {
        if let Some(existing) = self.position(&entry.user_id) {
            if self.entries[existing].time <= entry.time {
                return None;
            }
            self.entries.remove(existing);
        }

        let rank = self.entries.partition_point(|listed| listed.time <= entry.time);
        if rank >= capacity {
            self.entries.truncate(capacity);
            return None;
        }
        self.entries.insert(rank, entry);
        self.entries.truncate(capacity);
        Some(rank)
    }
}

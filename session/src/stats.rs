use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sweepbot_core::AchievementId;

use crate::UserId;

/// Per-difficulty record of one player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyStats {
    pub wins: u32,
    pub losses: u32,
    pub win_streak: u32,
    /// Fastest win in seconds.
    pub best: Option<f64>,
    /// Slowest win in seconds.
    pub worst: Option<f64>,
}

impl DifficultyStats {
    pub fn record_win(&mut self, secs: f64) {
        self.wins += 1;
        self.win_streak += 1;
        self.best = Some(self.best.map_or(secs, |best| best.min(secs)));
        self.worst = Some(self.worst.map_or(secs, |worst| worst.max(secs)));
    }

    /// Counts a loss and returns the streak it broke.
    pub fn record_loss(&mut self) -> u32 {
        self.losses += 1;
        std::mem::take(&mut self.win_streak)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    pub user_id: UserId,
    pub difficulties: BTreeMap<String, DifficultyStats>,
    /// Unlocked achievement ids, sorted.
    pub achievements: Vec<AchievementId>,
}

impl UserData {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn stats(&self, difficulty: &str) -> DifficultyStats {
        self.difficulties.get(difficulty).cloned().unwrap_or_default()
    }

    pub fn stats_mut(&mut self, difficulty: &str) -> &mut DifficultyStats {
        self.difficulties.entry(difficulty.to_owned()).or_default()
    }

    pub fn has_achievement(&self, id: AchievementId) -> bool {
        self.achievements.binary_search(&id).is_ok()
    }

    /// Records `ids` and returns the ones the player did not have yet.
    pub fn unlock(&mut self, ids: impl IntoIterator<Item = AchievementId>) -> Vec<AchievementId> {
        let mut fresh = Vec::new();
        for id in ids {
            if let Err(at) = self.achievements.binary_search(&id) {
                self.achievements.insert(at, id);
                fresh.push(id);
            }
        }
        fresh.sort_unstable();
        fresh
    }
}

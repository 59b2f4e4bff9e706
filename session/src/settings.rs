use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::UserId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds without a move before a game times out, 0 disables timeouts.
    pub end_after_secs: u64,
    /// Entries kept per leaderboard.
    pub leaderboard_size: usize,
    /// Where the file store keeps its records.
    pub data_dir: PathBuf,
    /// Users allowed to run admin commands.
    pub admins: Vec<UserId>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            end_after_secs: 600,
            leaderboard_size: 10,
            data_dir: PathBuf::from("data"),
            admins: Vec::new(),
        }
    }
}

impl Settings {
    pub fn end_after(&self) -> Option<Duration> {
        (self.end_after_secs > 0).then(|| Duration::from_secs(self.end_after_secs))
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|admin| admin == user_id)
    }
}

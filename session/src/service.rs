use chrono::{DateTime, Utc};
use std::time::Duration;
use sweepbot_core::*;

use crate::Result;
use crate::registry::lock;
use crate::*;

/// Everything needed to open a game.
#[derive(Clone, Debug, PartialEq)]
pub struct NewGame {
    pub user_id: UserId,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub difficulty: Difficulty,
    pub seed: u64,
}

/// How a finished game was settled.
#[derive(Clone, Debug, PartialEq)]
pub struct GameReport {
    pub user_id: UserId,
    pub difficulty: Difficulty,
    pub outcome: Outcome,
    pub elapsed: Duration,
    /// Achievements unlocked for the first time by this game.
    pub achievements: Vec<AchievementId>,
    /// Streak broken by a loss, only reported when non-zero.
    pub lost_streak: Option<u32>,
    pub win_streak: u32,
    /// Zero-based rank on the guild board, if the time made it.
    pub guild_rank: Option<usize>,
    /// Zero-based rank on the global board, if the time made it.
    pub global_rank: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Turn {
    Continue(Click),
    Ended(Click, GameReport),
}

/// Game lifecycle on top of three record stores: player data keyed by user
/// id, leaderboards keyed by [`Leaderboard::key`] and blacklist reasons keyed
/// by user id.
pub struct GameService<U, L, B> {
    settings: Settings,
    sessions: SessionRegistry,
    users: U,
    leaderboards: L,
    blacklist: B,
}

impl<U, L, B> GameService<U, L, B>
where
    U: Store<UserData>,
    L: Store<Leaderboard>,
    B: Store<String>,
{
    pub fn new(settings: Settings, users: U, leaderboards: L, blacklist: B) -> Self {
        Self {
            settings,
            sessions: SessionRegistry::new(),
            users,
            leaderboards,
            blacklist,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn start(&self, request: NewGame, now: DateTime<Utc>) -> Result<SharedSession> {
        if let Some(reason) = self.blacklist.get(&request.user_id)? {
            log::info!("Refused game for blacklisted user {}", request.user_id);
            return Err(SessionError::Blacklisted(reason));
        }
        if self.sessions.contains(&request.user_id) {
            return Err(SessionError::AlreadyPlaying);
        }

        let config = request.difficulty.config()?;
        let game = RandomGenerator::new(request.seed).generate(config)?;
        let stats = self.user_data(&request.user_id)?.stats(request.difficulty.name());
        let session = PlaySession::new(
            request.user_id,
            request.channel_id,
            request.guild_id,
            request.difficulty,
            game,
            stats,
            now,
        );

        log::info!(
            "{} started a {} game with seed {}",
            session.user_id(),
            request.difficulty.name(),
            request.seed
        );
        self.sessions.insert(session)
    }

    pub fn click(&self, user_id: &str, pos: Coord2, now: DateTime<Utc>) -> Result<Turn> {
        let shared = self.sessions.get(user_id).ok_or(SessionError::NoActiveGame)?;
        let mut session = lock(&shared)?;
        let click = session.click(pos, now)?;

        if !click.outcome.is_terminal() {
            return Ok(Turn::Continue(click));
        }
        let report = self.finish(&shared, &mut session, Some(&click), click.outcome, true, now)?;
        Ok(Turn::Ended(click, report))
    }

    pub fn toggle_flag_mode(&self, user_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let shared = self.sessions.get(user_id).ok_or(SessionError::NoActiveGame)?;
        let mut session = lock(&shared)?;
        Ok(session.toggle_flag_mode(now))
    }

    /// Abandons the user's game.
    pub fn end(&self, user_id: &str, now: DateTime<Utc>) -> Result<GameReport> {
        let shared = self.sessions.get(user_id).ok_or(SessionError::NoActiveGame)?;
        let mut session = lock(&shared)?;
        self.finish(&shared, &mut session, None, Outcome::ManuallyEnded, true, now)
    }

    /// Ends the user's game as a win without touching stats or leaderboards.
    pub fn force_win(&self, user_id: &str, now: DateTime<Utc>) -> Result<GameReport> {
        let shared = self.sessions.get(user_id).ok_or(SessionError::NoActiveGame)?;
        let mut session = lock(&shared)?;
        log::info!("Forcing a win for {user_id}");
        self.finish(&shared, &mut session, None, Outcome::Won, false, now)
    }

    /// Copy of the user's board, mines included.
    pub fn reveal_board(&self, user_id: &str) -> Result<Game> {
        let shared = self.sessions.get(user_id).ok_or(SessionError::NoActiveGame)?;
        let session = lock(&shared)?;
        Ok(session.game().clone())
    }

    /// Times out every game idle for longer than the configured limit.
    pub fn expire_idle(&self, now: DateTime<Utc>) -> Vec<GameReport> {
        let Some(timeout) = self.settings.end_after() else {
            return Vec::new();
        };

        let mut reports = Vec::new();
        for (user_id, shared) in self.sessions.idle(now, timeout) {
            match self.time_out(&shared, now, timeout) {
                Ok(Some(report)) => reports.push(report),
                Ok(None) | Err(SessionError::NoActiveGame) => {}
                Err(err) => log::warn!("Failed to time out game of {user_id}: {err}"),
            }
        }

        if !reports.is_empty() {
            log::info!("Timed out {} idle games", reports.len());
        }
        reports
    }

    /// The sweep only saw the session idle without its lock held, a click may
    /// have landed since.
    fn time_out(
        &self,
        shared: &SharedSession,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<Option<GameReport>> {
        let mut session = lock(shared)?;
        if !session.is_idle(now, timeout) {
            return Ok(None);
        }
        self.finish(shared, &mut session, None, Outcome::TimedOut, true, now).map(Some)
    }

    /// Settles a game: stats, achievements and leaderboards, then frees the
    /// user to start another one. A board the engine already finished keeps
    /// its real outcome over `outcome`. Nothing is freed until the player
    /// record is stored, so a failed write can be retried with [`Self::end`].
    fn finish(
        &self,
        shared: &SharedSession,
        session: &mut PlaySession,
        last_click: Option<&Click>,
        outcome: Outcome,
        on_record: bool,
        now: DateTime<Utc>,
    ) -> Result<GameReport> {
        if session.concluded().is_some() {
            return Err(SessionError::NoActiveGame);
        }
        let outcome = match session.game().state() {
            GameState::Won => Outcome::Won,
            GameState::Lost => Outcome::Lost,
            GameState::InProgress => outcome,
        };

        let difficulty = session.difficulty();
        let elapsed = session.elapsed(now);
        let mut user = self.user_data(session.user_id())?;

        // Single click wins are luck, they count for achievements only.
        let lucky = outcome == Outcome::Won && session.moves() <= 1;
        let ranked = on_record && difficulty.is_ranked() && !lucky;
        let mut lost_streak = None;
        if ranked {
            let stats = user.stats_mut(difficulty.name());
            match outcome {
                Outcome::Won => stats.record_win(elapsed.as_secs_f64()),
                Outcome::Lost => lost_streak = Some(stats.record_loss()).filter(|&s| s > 0),
                _ => {}
            }
        }
        let stats = user.stats(difficulty.name());

        let unlocked = session.final_unlocks(last_click, outcome, &stats, now);
        let achievements = user.unlock(unlocked);
        self.users.put(session.user_id(), &user)?;

        session.conclude(outcome);
        self.sessions.remove(session.user_id(), shared);

        let (mut guild_rank, mut global_rank) = (None, None);
        if ranked && outcome == Outcome::Won {
            let entry = LeaderboardEntry {
                user_id: session.user_id().to_owned(),
                time: elapsed.as_secs_f64(),
            };
            if let Some(guild_id) = session.guild_id() {
                guild_rank = self.submit(guild_id, difficulty, entry.clone());
            }
            global_rank = self.submit(GLOBAL_SCOPE, difficulty, entry);
        }

        log::info!(
            "{} game of {} ended {:?} after {:.2}s",
            difficulty.name(),
            session.user_id(),
            outcome,
            elapsed.as_secs_f64()
        );
        Ok(GameReport {
            user_id: session.user_id().to_owned(),
            difficulty,
            outcome,
            elapsed,
            achievements,
            lost_streak,
            win_streak: stats.win_streak,
            guild_rank,
            global_rank,
        })
    }

    /// Places `entry` on a board. The game is already settled at this point,
    /// so a failing store only costs the placement.
    fn submit(
        &self,
        scope: &str,
        difficulty: Difficulty,
        entry: LeaderboardEntry,
    ) -> Option<usize> {
        let key = Leaderboard::key(scope, difficulty.name());
        let result = self.leaderboards.get(&key).and_then(|board| {
            let mut board = board.unwrap_or_default();
            let rank = board.submit(entry, self.settings.leaderboard_size);
            if rank.is_some() {
                self.leaderboards.put(&key, &board)?;
            }
            Ok(rank)
        });
        result.unwrap_or_else(|err| {
            log::warn!("Failed to update leaderboard {key}: {err}");
            None
        })
    }

    pub fn user_data(&self, user_id: &str) -> Result<UserData> {
        Ok(self
            .users
            .get(user_id)?
            .unwrap_or_else(|| UserData::new(user_id)))
    }

    pub fn leaderboard(&self, scope: &str, difficulty: Difficulty) -> Result<Leaderboard> {
        let key = Leaderboard::key(scope, difficulty.name());
        Ok(self.leaderboards.get(&key)?.unwrap_or_default())
    }

    pub fn blacklist(&self, user_id: &str, reason: &str) -> Result<()> {
        log::info!("Blacklisted {user_id}: {reason}");
        self.blacklist.put(user_id, &reason.to_owned())?;
        Ok(())
    }

    pub fn unblacklist(&self, user_id: &str) -> Result<()> {
        self.blacklist.delete(user_id)?;
        Ok(())
    }

    pub fn blacklist_reason(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.blacklist.get(user_id)?)
    }
}

pub type MemoryGameService =
    GameService<MemoryStore<UserData>, MemoryStore<Leaderboard>, MemoryStore<String>>;

pub type FileGameService =
    GameService<JsonFileStore<UserData>, JsonFileStore<Leaderboard>, JsonFileStore<String>>;

impl MemoryGameService {
    pub fn in_memory(settings: Settings) -> Self {
        Self::new(settings, MemoryStore::new(), MemoryStore::new(), MemoryStore::new())
    }
}

impl FileGameService {
    /// Stores users, leaderboards and the blacklist in subdirectories of
    /// [`Settings::data_dir`].
    pub fn open(settings: Settings) -> Result<Self> {
        let dir = settings.data_dir.clone();
        let users = JsonFileStore::open(dir.join("users"))?;
        let leaderboards = JsonFileStore::open(dir.join("leaderboards"))?;
        let blacklist = JsonFileStore::open(dir.join("blacklist"))?;
        Ok(Self::new(settings, users, leaderboards, blacklist))
    }
}

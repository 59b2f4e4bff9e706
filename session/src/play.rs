use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::Duration;
use sweepbot_core::*;

use crate::{DifficultyStats, Result, UserId};

/// What a click turned into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Reveal,
    Flag(MarkOutcome),
    Chord,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Click {
    pub pos: Coord2,
    pub action: Action,
    pub outcome: Outcome,
    /// Safe cells opened by the click.
    pub revealed: CellCount,
    /// Achievements this click unlocked for the session so far. Terminal
    /// clicks are evaluated when the game is settled.
    pub unlocked: BTreeSet<AchievementId>,
}

/// One player's running game together with everything achievements need to
/// know about how it was played.
#[derive(Debug)]
pub struct PlaySession {
    user_id: UserId,
    channel_id: String,
    guild_id: Option<String>,
    difficulty: Difficulty,
    game: Game,
    /// Player's record for this difficulty as of the game start.
    stats: DifficultyStats,
    flag_mode: bool,
    actions: Actions,
    moves: u32,
    started_at: Option<DateTime<Utc>>,
    last_activity: DateTime<Utc>,
    unlocked: BTreeSet<AchievementId>,
    concluded: Option<Outcome>,
}

impl PlaySession {
    pub fn new(
        user_id: impl Into<UserId>,
        channel_id: impl Into<String>,
        guild_id: Option<String>,
        difficulty: Difficulty,
        game: Game,
        stats: DifficultyStats,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            channel_id: channel_id.into(),
            guild_id,
            difficulty,
            game,
            stats,
            flag_mode: false,
            actions: Actions::empty(),
            moves: 0,
            started_at: None,
            last_activity: now,
            unlocked: BTreeSet::new(),
            concluded: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn flag_mode(&self) -> bool {
        self.flag_mode
    }

    pub fn actions(&self) -> Actions {
        self.actions
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn concluded(&self) -> Option<Outcome> {
        self.concluded
    }

    /// Time since the first click, zero before it.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.started_at
            .and_then(|started| (now - started).to_std().ok())
            .unwrap_or_default()
    }

    /// Whether nothing happened for longer than `timeout`.
    pub fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        (now - self.last_activity)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }

    /// Flips between flagging and revealing, returns the new mode.
    pub fn toggle_flag_mode(&mut self, now: DateTime<Utc>) -> bool {
        self.flag_mode = !self.flag_mode;
        self.last_activity = now;
        self.flag_mode
    }

    /// Applies a click the way the current mode dictates. Opened numbers
    /// always chord, flag mode still opens the marked start cell.
    pub fn click(&mut self, pos: Coord2, now: DateTime<Utc>) -> Result<Click> {
        let cell = *self.game.find_cell(pos)?;
        if self.concluded.is_some() || self.game.is_finished() {
            return Err(GameError::AlreadyEnded.into());
        }

        self.started_at.get_or_insert(now);
        self.last_activity = now;
        self.moves += 1;

        let action = match (cell.state(), self.flag_mode) {
            (CellState::Revealed, _) => Action::Chord,
            (CellState::SafeStart, true) | (_, false) => Action::Reveal,
            (_, true) => Action::Flag(MarkOutcome::NoChange),
        };

        let mut unlocked = BTreeSet::new();
        if action == Action::Reveal {
            let snapshot = Snapshot::before_reveal(&self.game, pos);
            unlocked.extend(evaluate(&CATALOG, &snapshot, &self.history(&self.stats, now)));
        }

        let safe_before = self.game.safe_cells_left();
        let (action, outcome) = match action {
            Action::Reveal => {
                if cell.state() == CellState::Hidden {
                    self.actions |= Actions::REVEALED;
                }
                (action, self.game.reveal(pos)?)
            }
            Action::Flag(_) => {
                let mark = self.game.toggle_flag(pos)?;
                if mark == MarkOutcome::Flagged {
                    self.actions |= Actions::FLAGGED;
                }
                (Action::Flag(mark), Outcome::Nothing)
            }
            Action::Chord => {
                self.actions |= Actions::CHORDED;
                (action, self.game.chord(pos)?)
            }
        };
        let revealed = safe_before - self.game.safe_cells_left();

        let mut click = Click {
            pos,
            action,
            outcome,
            revealed,
            unlocked,
        };
        if !outcome.is_terminal() {
            let snapshot = Self::snapshot(&self.game, Some(&click), outcome);
            click
                .unlocked
                .extend(evaluate(&CATALOG, &snapshot, &self.history(&self.stats, now)));
        }
        self.unlocked.extend(click.unlocked.iter().copied());

        log::debug!(
            "{} clicked {:?} as {:?}: {:?}, {} opened",
            self.user_id,
            pos,
            click.action,
            outcome,
            revealed
        );
        Ok(click)
    }

    /// Every achievement the session unlocked once it ends with `outcome`.
    /// `stats` must already count this game.
    pub fn final_unlocks(
        &mut self,
        last_click: Option<&Click>,
        outcome: Outcome,
        stats: &DifficultyStats,
        now: DateTime<Utc>,
    ) -> BTreeSet<AchievementId> {
        let snapshot = Self::snapshot(&self.game, last_click, outcome);
        let history = self.history(stats, now);
        self.unlocked.extend(evaluate(&CATALOG, &snapshot, &history));
        self.unlocked.clone()
    }

    /// Closes the session, later clicks are refused.
    pub fn conclude(&mut self, outcome: Outcome) {
        self.concluded = Some(outcome);
    }

    fn snapshot<'a>(game: &'a Game, click: Option<&Click>, outcome: Outcome) -> Snapshot<'a> {
        let snapshot = Snapshot::after_action(game, outcome);
        let Some(click) = click else {
            return snapshot;
        };
        let snapshot = snapshot.with_cell(click.pos);
        match click.action {
            Action::Reveal => snapshot.with_reveal(click.revealed),
            Action::Chord => snapshot.with_chord(click.revealed),
            Action::Flag(MarkOutcome::Flagged) => snapshot.with_flag(),
            Action::Flag(_) => snapshot,
        }
    }

    fn history(&self, stats: &DifficultyStats, now: DateTime<Utc>) -> History {
        History {
            wins: stats.wins,
            losses: stats.losses,
            win_streak: stats.win_streak,
            actions: self.actions,
            moves: self.moves,
            elapsed: self.elapsed(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::UNIX_EPOCH + TimeDelta::seconds(secs)
    }

    /// 5x1 row with a mine in the middle.
    fn session(start: Option<Coord2>) -> PlaySession {
        let layout = MineLayout::from_mine_coords((5, 1), &[(2, 0)]).unwrap();
        let game = Game::new(layout, start).unwrap();
        PlaySession::new(
            "u1",
            "c1",
            Some("g1".to_owned()),
            Difficulty::Easy,
            game,
            DifficultyStats::default(),
            at(0),
        )
    }

    #[test]
    fn normal_mode_reveals() {
        let mut session = session(None);
        let click = session.click((3, 0), at(1)).unwrap();

        assert_eq!(click.action, Action::Reveal);
        assert_eq!(click.outcome, Outcome::Nothing);
        assert_eq!(click.revealed, 1);
        assert_eq!(session.moves(), 1);
        assert!(session.actions().contains(Actions::REVEALED));
        assert!(click.unlocked.contains(&4), "blind click on a fresh board");
    }

    #[test]
    fn flag_mode_flags_hidden_cells() {
        let mut session = session(None);
        assert!(session.toggle_flag_mode(at(1)));

        let click = session.click((2, 0), at(2)).unwrap();
        assert_eq!(click.action, Action::Flag(MarkOutcome::Flagged));
        assert!(click.unlocked.contains(&10));
        assert!(session.game().find_cell((2, 0)).unwrap().is_flagged());

        let click = session.click((2, 0), at(3)).unwrap();
        assert_eq!(click.action, Action::Flag(MarkOutcome::Unflagged));
        assert!(session.actions().contains(Actions::FLAGGED));
        assert!(!session.actions().contains(Actions::REVEALED));
    }

    #[test]
    fn flagging_a_safe_cell_is_a_false_alarm() {
        let mut session = session(None);
        session.toggle_flag_mode(at(0));

        let click = session.click((0, 0), at(1)).unwrap();
        assert!(click.unlocked.contains(&11));
        assert!(!click.unlocked.contains(&10));
    }

    #[test]
    fn flag_mode_still_opens_start_cell() {
        let mut session = session(Some((0, 0)));
        session.toggle_flag_mode(at(0));

        let click = session.click((0, 0), at(1)).unwrap();
        assert_eq!(click.action, Action::Reveal);
        assert!(session.game().find_cell((0, 0)).unwrap().is_revealed());
        assert!(!session.actions().contains(Actions::REVEALED));
    }

    #[test]
    fn revealed_cells_chord_in_either_mode() {
        let mut session = session(None);
        session.click((1, 0), at(1)).unwrap();
        session.toggle_flag_mode(at(2));
        session.click((2, 0), at(3)).unwrap();

        let click = session.click((1, 0), at(4)).unwrap();
        assert_eq!(click.action, Action::Chord);
        assert_eq!(click.revealed, 1);
        assert!(click.unlocked.contains(&3));
        assert!(session.actions().contains(Actions::CHORDED));
    }

    #[test]
    fn terminal_clicks_defer_to_settlement() {
        let mut session = session(None);
        let click = session.click((2, 0), at(5)).unwrap();

        assert_eq!(click.outcome, Outcome::Lost);
        assert!(!click.unlocked.contains(&1));

        let stats = DifficultyStats {
            losses: 1,
            ..DifficultyStats::default()
        };
        let unlocked = session.final_unlocks(Some(&click), Outcome::Lost, &stats, at(5));
        assert!(unlocked.contains(&1));
        assert!(unlocked.contains(&4));
        assert_eq!(session.concluded(), None);

        session.conclude(Outcome::Lost);
        assert_eq!(session.concluded(), Some(Outcome::Lost));
        assert!(matches!(
            session.click((0, 0), at(6)),
            Err(crate::SessionError::Game(GameError::AlreadyEnded))
        ));
    }

    #[test]
    fn one_click_win() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0)]).unwrap();
        let game = Game::new(layout, None).unwrap();
        let mut session =
            PlaySession::new("u1", "c1", None, Difficulty::Easy, game, Default::default(), at(0));

        let click = session.click((2, 2), at(1)).unwrap();
        assert_eq!(click.outcome, Outcome::Won);

        let stats = DifficultyStats {
            wins: 1,
            win_streak: 1,
            ..DifficultyStats::default()
        };
        let unlocked = session.final_unlocks(Some(&click), Outcome::Won, &stats, at(1));
        assert!(unlocked.contains(&0));
        assert!(unlocked.contains(&13));
    }

    #[test]
    fn timeout_without_click() {
        let mut session = session(None);
        let unlocked = session.final_unlocks(None, Outcome::TimedOut, &Default::default(), at(700));
        assert_eq!(unlocked, BTreeSet::from([12]));
    }

    #[test]
    fn clock_starts_on_first_click() {
        let mut session = session(None);
        assert_eq!(session.elapsed(at(50)), Duration::ZERO);

        session.click((0, 0), at(10)).unwrap();
        session.click((4, 0), at(25)).unwrap();
        assert_eq!(session.elapsed(at(40)), Duration::from_secs(30));
    }

    #[test]
    fn idle_after_timeout() {
        let mut session = session(None);
        let timeout = Duration::from_secs(600);

        assert!(!session.is_idle(at(600), timeout));
        assert!(session.is_idle(at(601), timeout));
        session.toggle_flag_mode(at(590));
        assert!(!session.is_idle(at(1000), timeout));
    }

    #[test]
    fn out_of_bounds_click_is_rejected_without_a_move() {
        let mut session = session(None);
        assert!(matches!(
            session.click((5, 0), at(1)),
            Err(crate::SessionError::Game(GameError::InvalidCoords))
        ));
        assert_eq!(session.moves(), 0);
    }
}

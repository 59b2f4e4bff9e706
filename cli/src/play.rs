use anyhow::Result;
use chrono::Utc;
use std::io::{BufRead, Write};
use sweepbot_core::*;
use sweepbot_session::*;

use crate::board::render;

const HELP: &str = "\
Commands:
  x y    click the cell in column x, row y
  f      toggle flag mode
  end    give up the game
  help   show this text
  reveal show every mine (admins only)
  win    end the game as a win (admins only)";

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Command {
    Click(Coord2),
    FlagMode,
    End,
    Help,
    Show,
    Reveal,
    Win,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next() {
            None => Self::Show,
            Some("f" | "flag") => Self::FlagMode,
            Some("end" | "quit" | "q") => Self::End,
            Some("help" | "?") => Self::Help,
            Some("reveal") => Self::Reveal,
            Some("win") => Self::Win,
            Some(x) => {
                let y = words.next()?;
                Self::Click((x.parse().ok()?, y.parse().ok()?))
            }
        };
        words.next().is_none().then_some(command)
    }
}

/// Runs the game `user_id` has open until it ends or `input` runs dry. Admins
/// can also peek at the mines or call the game won.
pub fn run<U, L, B>(
    service: &GameService<U, L, B>,
    user_id: &str,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<()>
where
    U: Store<UserData>,
    L: Store<Leaderboard>,
    B: Store<String>,
{
    let admin = service.settings().is_admin(user_id);
    show(service, user_id, &mut out)?;
    let mut line = String::new();

    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            let report = service.end(user_id, Utc::now())?;
            return summarize(&report, &mut out);
        }

        if let Some(report) = service
            .expire_idle(Utc::now())
            .into_iter()
            .find(|report| report.user_id == user_id)
        {
            writeln!(out, "Game timed out.")?;
            return summarize(&report, &mut out);
        }

        let Some(command) = Command::parse(&line) else {
            writeln!(out, "Unknown command, try `help`.")?;
            continue;
        };
        match command {
            Command::Show => show(service, user_id, &mut out)?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::FlagMode => {
                let on = service.toggle_flag_mode(user_id, Utc::now())?;
                writeln!(out, "Flag mode {}.", if on { "on" } else { "off" })?;
            }
            Command::End => {
                let report = service.end(user_id, Utc::now())?;
                return summarize(&report, &mut out);
            }
            Command::Reveal | Command::Win if !admin => writeln!(out, "No.")?,
            Command::Reveal => write!(out, "{}", render(&service.reveal_board(user_id)?, true))?,
            Command::Win => {
                let report = service.force_win(user_id, Utc::now())?;
                return summarize(&report, &mut out);
            }
            Command::Click(pos) => {
                let shared = service.sessions().get(user_id);
                match service.click(user_id, pos, Utc::now()) {
                    Ok(Turn::Continue(click)) => {
                        if let Action::Flag(mark) = click.action
                            && !mark.has_update()
                        {
                            writeln!(out, "Nothing to flag there.")?;
                        }
                        announce(&click.unlocked, &mut out)?;
                        show(service, user_id, &mut out)?;
                    }
                    Ok(Turn::Ended(_, report)) => {
                        if let Some(shared) = shared {
                            let session = shared
                                .lock()
                                .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
                            write!(out, "{}", render(session.game(), true))?;
                        }
                        return summarize(&report, &mut out);
                    }
                    Err(SessionError::Game(err)) => writeln!(out, "{err}.")?,
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }
}

fn show<U, L, B>(service: &GameService<U, L, B>, user_id: &str, out: &mut impl Write) -> Result<()>
where
    U: Store<UserData>,
    L: Store<Leaderboard>,
    B: Store<String>,
{
    let shared = service
        .sessions()
        .get(user_id)
        .ok_or(SessionError::NoActiveGame)?;
    let session = shared
        .lock()
        .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
    let game = session.game();

    write!(out, "{}", render(game, false))?;
    writeln!(
        out,
        "{} mines left{}",
        game.mines_left(),
        if session.flag_mode() { ", flag mode" } else { "" }
    )?;
    Ok(())
}

fn announce<'a>(
    ids: impl IntoIterator<Item = &'a AchievementId>,
    out: &mut impl Write,
) -> Result<()> {
    for achievement in ids.into_iter().filter_map(|&id| find_achievement(id)) {
        writeln!(out, "Achievement: {} ({})", achievement.name, achievement.description)?;
    }
    Ok(())
}

fn summarize(report: &GameReport, out: &mut impl Write) -> Result<()> {
    match report.outcome {
        Outcome::Won => writeln!(out, "You won in {:.2}s!", report.elapsed.as_secs_f64())?,
        Outcome::Lost => writeln!(out, "Boom, you lost.")?,
        Outcome::TimedOut => writeln!(out, "The game ended for inactivity.")?,
        Outcome::ManuallyEnded | Outcome::Nothing => writeln!(out, "Game ended.")?,
    }
    if let Some(streak) = report.lost_streak {
        writeln!(out, "That ended a {streak} win streak.")?;
    } else if report.win_streak > 1 {
        writeln!(out, "Win streak: {}", report.win_streak)?;
    }
    if let Some(rank) = report.guild_rank {
        writeln!(out, "Guild leaderboard: #{}", rank + 1)?;
    }
    if let Some(rank) = report.global_rank {
        writeln!(out, "Global leaderboard: #{}", rank + 1)?;
    }
    announce(&report.achievements, out)
}

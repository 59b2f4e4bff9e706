use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::io;
use std::path::PathBuf;
use sweepbot_core::*;
use sweepbot_session::*;

mod admin;
mod board;
mod config;
mod play;

#[derive(Parser, Debug)]
#[command(version, about = "Play minesweeper and keep score from the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Settings file, defaults are used if it does not exist
    #[arg(short, long, default_value = "sweepbot.toml")]
    config: PathBuf,

    /// Who is playing
    #[arg(short, long, env = "USER", default_value = "player")]
    user: String,

    /// Guild whose leaderboard games count towards
    #[arg(short, long)]
    guild: Option<String>,

    /// Override the data directory from the settings file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a game and play it on stdin
    Play {
        #[arg(short, long, value_enum, default_value_t = Level::Easy)]
        difficulty: Level,

        /// Mines on a custom board, implies `--difficulty custom`
        #[arg(short, long)]
        mines: Option<CellCount>,

        /// Only keep the start cell itself free of mines
        #[arg(long)]
        allow_mines_near_start: bool,

        /// Do not mark a start cell at all
        #[arg(long)]
        no_start_cell: bool,

        /// Force a seed instead of random
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Show wins, losses, times and achievements
    Stats,
    /// Show the fastest wins
    Leaderboard {
        #[arg(short, long, value_enum, default_value_t = Level::Easy)]
        difficulty: Level,
    },
    /// Manage the blacklist, only for users listed as admins
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommand,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
    Custom,
}

impl Level {
    fn ranked(self) -> Option<Difficulty> {
        match self {
            Self::Easy => Some(Difficulty::Easy),
            Self::Medium => Some(Difficulty::Medium),
            Self::Hard => Some(Difficulty::Hard),
            Self::Custom => None,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let mut settings = config::load(&args.config)?;
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    log::debug!("Settings: {settings:?}");
    let service = FileGameService::open(settings).context("Could not open the data directory")?;

    match args.command {
        Command::Play {
            difficulty,
            mines,
            allow_mines_near_start,
            no_start_cell,
            seed,
        } => {
            let difficulty = match (difficulty.ranked(), mines) {
                (Some(ranked), None) if !allow_mines_near_start && !no_start_cell => ranked,
                (ranked, mines) => Difficulty::Custom {
                    mines: mines.unwrap_or_else(|| ranked.unwrap_or(Difficulty::Easy).mines()),
                    allow_mines_near_start,
                    no_start_cell,
                },
            };
            let seed = seed.unwrap_or_else(rand::random);
            log::debug!("seed: {seed}");

            service.start(
                NewGame {
                    user_id: args.user.clone(),
                    channel_id: "terminal".to_owned(),
                    guild_id: args.guild,
                    difficulty,
                    seed,
                },
                Utc::now(),
            )?;
            play::run(&service, &args.user, io::stdin().lock(), io::stdout().lock())
        }
        Command::Stats => print_stats(&service, &args.user),
        Command::Leaderboard { difficulty } => {
            let Some(difficulty) = difficulty.ranked() else {
                bail!("Custom games have no leaderboard");
            };
            let scope = args.guild.as_deref().unwrap_or(GLOBAL_SCOPE);
            let board = service.leaderboard(scope, difficulty)?;
            println!("{} leaderboard ({scope})", difficulty.name());
            if board.entries().is_empty() {
                println!("  no wins yet");
            }
            for (rank, entry) in board.entries().iter().enumerate() {
                println!("{:>3}. {:<20} {:>8.2}s", rank + 1, entry.user_id, entry.time);
            }
            Ok(())
        }
        Command::Admin { command } => admin::run(&service, &args.user, command, io::stdout()),
    }
}

fn print_stats(service: &FileGameService, user_id: &str) -> Result<()> {
    let user = service.user_data(user_id)?;
    println!("Stats for {user_id}");
    for difficulty in Difficulty::RANKED {
        let stats = user.stats(difficulty.name());
        let time = |secs: Option<f64>| secs.map_or_else(|| "-".to_owned(), |s| format!("{s:.2}s"));
        println!(
            "  {:<7} {} won, {} lost, streak {}, best {}, worst {}",
            difficulty.name(),
            stats.wins,
            stats.losses,
            stats.win_streak,
            time(stats.best),
            time(stats.worst),
        );
    }

    println!("Achievements {}/{}", user.achievements.len(), CATALOG.len());
    for achievement in &CATALOG {
        let mark = if user.has_achievement(achievement.id) { 'x' } else { ' ' };
        println!("  [{mark}] {}: {}", achievement.name, achievement.description);
    }
    Ok(())
}

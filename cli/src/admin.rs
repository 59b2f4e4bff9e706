use anyhow::Result;
use clap::Subcommand;
use std::io::Write;
use sweepbot_session::*;

const NO_REASON: &str = "No message provided";

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Stop a user from starting games
    Blacklist {
        target: UserId,
        /// Reason shown to the user when they try to play
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Let a blacklisted user play again
    Unblacklist { target: UserId },
}

/// Runs `command` on behalf of `caller`, who must be listed as an admin.
pub fn run<U, L, B>(
    service: &GameService<U, L, B>,
    caller: &str,
    command: AdminCommand,
    mut out: impl Write,
) -> Result<()>
where
    U: Store<UserData>,
    L: Store<Leaderboard>,
    B: Store<String>,
{
    if !service.settings().is_admin(caller) {
        log::warn!("{caller} tried an admin command");
        writeln!(out, "No.")?;
        return Ok(());
    }

    match command {
        AdminCommand::Blacklist { target, message } => {
            let reason = message.filter(|m| !m.is_empty());
            let reason = reason.as_deref().unwrap_or(NO_REASON);
            service.blacklist(&target, reason)?;
            writeln!(out, "Blacklisted `{target}` for reason: `{reason}`")?;
        }
        AdminCommand::Unblacklist { target } => match service.blacklist_reason(&target)? {
            Some(reason) => {
                service.unblacklist(&target)?;
                writeln!(out, "Removed blacklist for `{target}` (was: `{reason}`)")?;
            }
            None => writeln!(out, "`{target}` is not blacklisted")?,
        },
    }
    Ok(())
}

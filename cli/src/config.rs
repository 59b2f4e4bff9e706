use anyhow::{Context, Result};
use std::path::Path;
use std::{fs, io};
use sweepbot_session::Settings;

/// Reads settings from a TOML file, a missing file means defaults.
pub fn load(path: &Path) -> Result<Settings> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Could not read {}", path.display()));
        }
    };
    parse(&text).with_context(|| format!("Invalid config in {}", path.display()))
}

fn parse(text: &str) -> Result<Settings> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn partial_config_keeps_defaults() {
        let settings = parse("leaderboard_size = 5\n").unwrap();

        assert_eq!(settings.leaderboard_size, 5);
        assert_eq!(settings.end_after_secs, 600);
        assert_eq!(settings.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn full_config() {
        let settings = parse(
            r#"
            end_after_secs = 0
            leaderboard_size = 3
            data_dir = "/var/lib/sweepbot"
            admins = ["alice"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.end_after(), None);
        assert_eq!(settings.data_dir, PathBuf::from("/var/lib/sweepbot"));
        assert!(settings.is_admin("alice"));
        assert!(!settings.is_admin("bob"));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(parse("leaderboard_size = \"ten\"").is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let settings = load(Path::new("/nonexistent/sweepbot.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}

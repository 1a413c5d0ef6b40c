use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::{errors::Error, Result};

/// Typed configuration for the bot.
///
/// Everything comes from the environment (with `.env` support) and is
/// validated once at startup; nothing here can fail at request time.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub bot_token: String,
    /// Channel the guide gate checks against: `@username` or a numeric id.
    pub channel: String,
    /// Users allowed to run admin commands (`/stats`, `/broadcast`).
    pub admin_users: Vec<i64>,

    // Assets
    pub assets_dir: PathBuf,
    pub welcome_photo: PathBuf,
    pub qr_photo: PathBuf,

    // Persistence
    pub grants_file: PathBuf,
    pub events_file: PathBuf,

    // Daily reminder
    pub reminder_time: NaiveTime,
    pub reminder_tz: Tz,

    // Collaborator-boundary timeouts
    pub lookup_timeout: Duration,
    pub send_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").and_then(non_empty).ok_or_else(|| {
            Error::Config("BOT_TOKEN environment variable is required".to_string())
        })?;

        let channel = env_str("CHANNEL").and_then(non_empty).ok_or_else(|| {
            Error::Config("CHANNEL environment variable is required".to_string())
        })?;

        let admin_users = parse_csv_i64(env_str("ADMIN_USERS"));

        let assets_dir = env_path("ASSETS_DIR").unwrap_or_else(|| PathBuf::from("assets"));
        let welcome_photo =
            env_path("WELCOME_PHOTO").unwrap_or_else(|| assets_dir.join("welcome.jpg"));
        let qr_photo = env_path("QR_PHOTO").unwrap_or_else(|| assets_dir.join("qr.png"));

        let grants_file = env_path("GRANTS_FILE")
            .unwrap_or_else(|| PathBuf::from("/tmp/mindmeld-grants.json"));
        let events_file = env_path("EVENTS_FILE").unwrap_or_else(|| PathBuf::from("events.csv"));

        let reminder_raw = env_str("REMINDER_TIME").unwrap_or_else(|| "09:00".to_string());
        let reminder_time = NaiveTime::parse_from_str(reminder_raw.trim(), "%H:%M")
            .map_err(|e| Error::Config(format!("invalid REMINDER_TIME {reminder_raw:?}: {e}")))?;

        let tz_raw = env_str("REMINDER_TZ").unwrap_or_else(|| "Europe/Moscow".to_string());
        let reminder_tz: Tz = tz_raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid REMINDER_TZ {tz_raw:?}: {e}")))?;

        let lookup_timeout = Duration::from_millis(env_u64("LOOKUP_TIMEOUT_MS").unwrap_or(5_000));
        let send_timeout = Duration::from_millis(env_u64("SEND_TIMEOUT_MS").unwrap_or(30_000));

        Ok(Self {
            bot_token,
            channel,
            admin_users,
            assets_dir,
            welcome_photo,
            qr_photo,
            grants_file,
            events_file,
            reminder_time,
            reminder_tz,
            lookup_timeout,
            send_timeout,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_parsing_skips_junk() {
        let ids = parse_csv_i64(Some("1, 2,,abc, 3 ".to_string()));
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(parse_csv_i64(None).is_empty());
    }

    #[test]
    fn reminder_time_format() {
        assert!(NaiveTime::parse_from_str("09:00", "%H:%M").is_ok());
        assert!(NaiveTime::parse_from_str("9am", "%H:%M").is_err());
    }

    #[test]
    fn timezone_must_be_named_zone() {
        assert!("Europe/Moscow".parse::<Tz>().is_ok());
        assert!("UTC+3".parse::<Tz>().is_err());
    }
}

use crate::components::google_calendar::ServiceAccountKey;
use crate::error::{config_error, env_error, BotResult};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default Google Calendar API root
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
/// Default address for the health check server
pub const DEFAULT_HEALTH_ADDR: &str = "0.0.0.0:8080";
/// Default timeout for a single create-event call, in seconds
pub const DEFAULT_CREATE_EVENT_TIMEOUT_SECS: u64 = 15;
/// Default idle time before a session is evicted, in seconds
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 900;
/// Default locale for replies
pub const DEFAULT_LOCALE: &str = "en";
/// Optional file with non-secret settings
pub const SETTINGS_FILE: &str = "config/bot.toml";

/// Main configuration structure for the bot
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// Google Calendar ID events are created in
    pub google_calendar_id: String,
    /// Service account used to authenticate against Google
    pub service_account: ServiceAccountKey,
    /// Root of the Google Calendar REST API
    pub google_api_base: String,
    /// Address the health check server binds to
    pub health_addr: String,
    /// Timeout for a single create-event call
    pub create_event_timeout_secs: u64,
    /// Idle time after which a conversation session is dropped
    pub session_idle_timeout_secs: u64,
    /// Locale for user-facing replies
    pub bot_locale: String,
}

/// Non-secret settings that may come from `config/bot.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub google_api_base: Option<String>,
    pub health_addr: Option<String>,
    pub create_event_timeout_secs: Option<u64>,
    pub session_idle_timeout_secs: Option<u64>,
    pub bot_locale: Option<String>,
}

impl FileSettings {
    /// Read settings from a TOML file, returning defaults if it does not exist
    pub fn read(path: impl AsRef<Path>) -> BotResult<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let file = FileSettings::read(SETTINGS_FILE)?;
        Self::from_sources(|key| env::var(key).ok(), file)
    }

    /// Build the configuration from a variable lookup and file settings.
    /// Environment values take precedence over the file.
    pub fn from_sources<F>(lookup: F, file: FileSettings) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| env_error(key));

        let discord_token = required("DISCORD_TOKEN")?;
        let google_calendar_id = required("GOOGLE_CALENDAR_ID")?;
        let service_account = load_service_account(&required("GOOGLE_SERVICE_JSON")?)?;

        let google_api_base = lookup("GOOGLE_CALENDAR_API_BASE")
            .or(file.google_api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let health_addr = lookup("HEALTH_ADDR")
            .or(file.health_addr)
            .unwrap_or_else(|| DEFAULT_HEALTH_ADDR.to_string());

        let create_event_timeout_secs = match lookup("CREATE_EVENT_TIMEOUT_SECS") {
            Some(raw) => parse_secs("CREATE_EVENT_TIMEOUT_SECS", &raw)?,
            None => file
                .create_event_timeout_secs
                .unwrap_or(DEFAULT_CREATE_EVENT_TIMEOUT_SECS),
        };

        let session_idle_timeout_secs = match lookup("SESSION_IDLE_TIMEOUT_SECS") {
            Some(raw) => parse_secs("SESSION_IDLE_TIMEOUT_SECS", &raw)?,
            None => file
                .session_idle_timeout_secs
                .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT_SECS),
        };

        let bot_locale = lookup("BOT_LOCALE")
            .or(file.bot_locale)
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        Ok(Config {
            discord_token,
            google_calendar_id,
            service_account,
            google_api_base,
            health_addr,
            create_event_timeout_secs,
            session_idle_timeout_secs,
            bot_locale,
        })
    }

    /// Timeout applied to every create-event call
    pub fn create_event_timeout(&self) -> Duration {
        Duration::from_secs(self.create_event_timeout_secs)
    }

    /// Idle time before a session is evicted
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }
}

/// Parse a positive number of seconds
fn parse_secs(var: &str, raw: &str) -> BotResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(config_error(&format!("Invalid {} value: {}", var, raw))),
    }
}

/// The key is either inline JSON or a path to the key file
fn load_service_account(value: &str) -> BotResult<ServiceAccountKey> {
    let json = if value.trim_start().starts_with('{') {
        value.to_string()
    } else {
        fs::read_to_string(value).map_err(|e| {
            config_error(&format!("Failed to read service account file {}: {}", value, e))
        })?
    };

    serde_json::from_str(&json)
        .map_err(|e| config_error(&format!("Invalid service account JSON: {}", e)))
}

use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub movies_path: PathBuf,
    pub meetings_path: PathBuf,
    pub meeting_poll_interval_secs: u64,
    /// How long list-mutation confirmations stay in the channel
    pub confirmation_ttl: Duration,
    pub list_cache_capacity: usize,
    pub dev_guild_id: Option<u64>,
    pub status_message: String,
    pub list_footer: String,
}

const DEFAULT_LIST_FOOTER: &str = "A good movie is all we need.";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let confirmation_ttl = match env::var("CONFIRMATION_TTL") {
            Ok(raw) => humantime::parse_duration(raw.trim()).map_err(|e| {
                anyhow::anyhow!("CONFIRMATION_TTL must be a duration like `15s`: {}", e)
            })?,
            Err(_) => Duration::from_secs(15),
        };

        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .or_else(|_| env::var("BOT_TOKEN"))
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            movies_path: env::var("MOVIES_PATH")
                .unwrap_or_else(|_| "./movies.json".to_string())
                .into(),
            meetings_path: env::var("MEETINGS_PATH")
                .unwrap_or_else(|_| "./meetings.json".to_string())
                .into(),
            meeting_poll_interval_secs: env::var("MEETING_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            confirmation_ttl,
            list_cache_capacity: env::var("LIST_CACHE_CAPACITY")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
            dev_guild_id: env::var("DEV_GUILD_ID").ok().and_then(|id| id.parse().ok()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "🍿 /listmovies".to_string()),
            list_footer: env::var("LIST_FOOTER")
                .unwrap_or_else(|_| DEFAULT_LIST_FOOTER.to_string()),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("movies_path", &self.movies_path)
            .field("meetings_path", &self.meetings_path)
            .field(
                "meeting_poll_interval_secs",
                &self.meeting_poll_interval_secs,
            )
            .field("confirmation_ttl", &self.confirmation_ttl)
            .field("list_cache_capacity", &self.list_cache_capacity)
            .field("dev_guild_id", &self.dev_guild_id)
            .field("status_message", &self.status_message)
            .field("list_footer", &self.list_footer)
            .finish()
    }
}

/// Embed description limit is 4096 characters
pub const DISCORD_EMBED_LIMIT: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Test missing token
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("BOT_TOKEN");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when the token is missing");

        // 2. Legacy token name and defaults
        env::set_var("BOT_TOKEN", "legacy_token");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "legacy_token");
        assert_eq!(config.movies_path, PathBuf::from("./movies.json"));
        assert_eq!(config.meetings_path, PathBuf::from("./meetings.json"));
        assert_eq!(config.meeting_poll_interval_secs, 60);
        assert_eq!(config.confirmation_ttl, Duration::from_secs(15));

        // 3. Overrides
        env::set_var("DISCORD_TOKEN", "test_token");
        env::set_var("CONFIRMATION_TTL", "1m 30s");
        env::set_var("DEV_GUILD_ID", "42");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.confirmation_ttl, Duration::from_secs(90));
        assert_eq!(config.dev_guild_id, Some(42));

        // 4. Bad duration is rejected
        env::set_var("CONFIRMATION_TTL", "soon");
        assert!(Config::build().is_err());
        env::remove_var("CONFIRMATION_TTL");

        // 5. Test debug redaction
        let debug_output = format!("{:?}", Config::build().unwrap());
        assert!(!debug_output.contains("test_token"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("BOT_TOKEN");
        env::remove_var("DEV_GUILD_ID");
    }
}

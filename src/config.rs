//! Startup configuration read from the process environment.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PLAYLISTS_FILE: &str = "playlists.json";
pub const DEFAULT_CONTROL_CHANNEL: &str = "sil3ntbot";
pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com";

/// Errors raised while building the configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token used to open the gateway session.
    pub discord_token: String,
    /// YouTube Data API v3 key used by the search gateway.
    pub youtube_api_key: String,
    pub youtube_api_base_url: String,
    /// Where the three playlists are persisted.
    pub playlists_file: PathBuf,
    /// Name of the text channel the control surface is posted in.
    pub control_channel: String,
    /// Optional cookies file handed to yt-dlp.
    pub ytdlp_cookies: Option<PathBuf>,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // DISCORD_BOT_TOKEN is the name earlier deployments used
        let discord_token = get("DISCORD_TOKEN")
            .or_else(|| get("DISCORD_BOT_TOKEN"))
            .ok_or(ConfigError::Missing("DISCORD_TOKEN (or DISCORD_BOT_TOKEN)"))?;
        let youtube_api_key =
            get("YOUTUBE_API_KEY").ok_or(ConfigError::Missing("YOUTUBE_API_KEY"))?;

        Ok(Self {
            discord_token,
            youtube_api_key,
            youtube_api_base_url: get("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string()),
            playlists_file: get("PLAYLISTS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PLAYLISTS_FILE)),
            control_channel: get("CONTROL_CHANNEL_NAME")
                .map(|name| name.trim().to_lowercase())
                .unwrap_or_else(|| DEFAULT_CONTROL_CHANNEL.to_string()),
            ytdlp_cookies: get("YTDLP_COOKIES").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "token"),
            ("YOUTUBE_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.discord_token, "token");
        assert_eq!(config.youtube_api_key, "key");
        assert_eq!(config.playlists_file, PathBuf::from("playlists.json"));
        assert_eq!(config.control_channel, "sil3ntbot");
        assert_eq!(config.youtube_api_base_url, "https://www.googleapis.com");
        assert!(config.ytdlp_cookies.is_none());
    }

    #[test]
    fn test_missing_token_fails_fast() {
        let err = Config::from_lookup(lookup_from(&[("YOUTUBE_API_KEY", "key")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN (or DISCORD_BOT_TOKEN)"));
        assert_eq!(
            err.to_string(),
            "Missing required environment variable DISCORD_TOKEN (or DISCORD_BOT_TOKEN)"
        );
    }

    #[test]
    fn test_legacy_token_name_is_accepted() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "legacy"),
            ("YOUTUBE_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.discord_token, "legacy");
    }

    #[test]
    fn test_current_token_name_wins() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "current"),
            ("DISCORD_BOT_TOKEN", "legacy"),
            ("YOUTUBE_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.discord_token, "current");
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let err = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "token"),
            ("YOUTUBE_API_KEY", "   "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("YOUTUBE_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "token"),
            ("YOUTUBE_API_KEY", "key"),
            ("PLAYLISTS_FILE", "/data/lists.json"),
            ("CONTROL_CHANNEL_NAME", " Music-Room "),
            ("YTDLP_COOKIES", "cookies.txt"),
        ]))
        .unwrap();

        assert_eq!(config.playlists_file, PathBuf::from("/data/lists.json"));
        assert_eq!(config.control_channel, "music-room");
        assert_eq!(config.ytdlp_cookies, Some(PathBuf::from("cookies.txt")));
    }
}

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::NeoRadarError;

pub const DEFAULT_NEOWS_BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // NeoWs
    pub nasa_api_key: String,
    pub neows_base_url: String,
    pub feed_timeout_secs: u64,
    pub detail_timeout_secs: u64,

    // Streaming
    pub stream_cadence_secs: u64,
    pub stream_poll_secs: u64,

    // Auth
    pub jwt_secret: String,
    pub jwt_issuer: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,
    pub allowed_origins: Vec<String>,
}

/// Timing of one stream session: how often to tick, and how finely to
/// poll for disconnection while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub cadence: Duration,
    pub poll: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            cadence: Duration::from_secs(60),
            poll: Duration::from_secs(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nasa_api_key: "DEMO_KEY".to_string(),
            neows_base_url: DEFAULT_NEOWS_BASE_URL.to_string(),
            feed_timeout_secs: 15,
            detail_timeout_secs: 10,
            stream_cadence_secs: 60,
            stream_poll_secs: 1,
            jwt_secret: String::new(),
            jwt_issuer: "neoradar".to_string(),
            web_host: "0.0.0.0".to_string(),
            web_port: 3000,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, NeoRadarError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys take the
    /// defaults; `JWT_SECRET` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NeoRadarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NeoRadarError::Config("JWT_SECRET is required".to_string()))?;

        let config = Self {
            nasa_api_key: lookup("NASA_API_KEY").unwrap_or(defaults.nasa_api_key),
            neows_base_url: lookup("NEOWS_BASE_URL").unwrap_or(defaults.neows_base_url),
            feed_timeout_secs: parsed(&lookup, "FEED_TIMEOUT_SECS", defaults.feed_timeout_secs)?,
            detail_timeout_secs: parsed(
                &lookup,
                "DETAIL_TIMEOUT_SECS",
                defaults.detail_timeout_secs,
            )?,
            stream_cadence_secs: parsed(
                &lookup,
                "STREAM_CADENCE_SECS",
                defaults.stream_cadence_secs,
            )?,
            stream_poll_secs: parsed(&lookup, "STREAM_POLL_SECS", defaults.stream_poll_secs)?,
            jwt_secret,
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            web_host: lookup("WEB_HOST").unwrap_or(defaults.web_host),
            web_port: parsed(&lookup, "WEB_PORT", defaults.web_port)?,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.allowed_origins),
        };

        if config.stream_poll_secs == 0 || config.stream_poll_secs > config.stream_cadence_secs {
            return Err(NeoRadarError::Config(format!(
                "STREAM_POLL_SECS must be between 1 and STREAM_CADENCE_SECS ({})",
                config.stream_cadence_secs
            )));
        }

        Ok(config)
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            cadence: Duration::from_secs(self.stream_cadence_secs),
            poll: Duration::from_secs(self.stream_poll_secs),
        }
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, NeoRadarError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| NeoRadarError::Config(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.nasa_api_key, "DEMO_KEY");
        assert_eq!(config.stream_settings(), StreamSettings::default());
        assert_eq!(config.feed_timeout(), Duration::from_secs(15));
        assert_eq!(config.detail_timeout(), Duration::from_secs(10));
        assert_eq!(config.web_port, 3000);
    }

    #[test]
    fn secret_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: JWT_SECRET is required");
    }

    #[test]
    fn malformed_number_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("STREAM_CADENCE_SECS", "sixty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("STREAM_CADENCE_SECS"));
    }

    #[test]
    fn poll_cannot_exceed_cadence() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("STREAM_CADENCE_SECS", "5"),
            ("STREAM_POLL_SECS", "10"),
        ]));
        assert!(err.is_err());
    }

    #[test]
    fn origins_skip_blanks() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("ALLOWED_ORIGINS", "https://a.example, ,https://b.example,"),
        ]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }
}

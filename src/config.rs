// Service configuration
//
// Defaults can be overridden from the environment:
// - DURATION_LIMIT  maximum video duration in seconds (default 10800)
// - YTDLP_PATH      yt-dlp binary to run (default: auto-detect)
// - YTDLP_TIMEOUT   extraction timeout in seconds (default 30)
// - COOKIE_PATH     JSON cookie file (default: <config dir>/youtube-format-selector/cookies.json)

use std::path::PathBuf;

/// Errors raised while loading configuration or cookie files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration for the format selector service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Longest video accepted, in seconds
    pub duration_limit: u64,
    /// Explicit yt-dlp binary; looked up when unset
    pub ytdlp_path: Option<String>,
    /// Extraction timeout in seconds
    pub timeout_seconds: u64,
    /// JSON cookie file
    pub cookie_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            duration_limit: 10800,
            ytdlp_path: None,
            timeout_seconds: 30,
            cookie_path: default_cookie_path(),
        }
    }
}

fn default_cookie_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("youtube-format-selector").join("cookies.json"))
}

fn parse_env<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        _ => Ok(None),
    }
}

impl ServiceConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(limit) = parse_env::<u64>("DURATION_LIMIT")? {
            config.duration_limit = limit;
        }
        if let Some(path) = parse_env::<String>("YTDLP_PATH")? {
            config.ytdlp_path = Some(path);
        }
        if let Some(timeout) = parse_env::<u64>("YTDLP_TIMEOUT")? {
            config.timeout_seconds = timeout;
        }
        if let Some(path) = parse_env::<PathBuf>("COOKIE_PATH")? {
            config.cookie_path = Some(path);
        }

        Ok(config)
    }

    pub fn with_duration_limit(mut self, seconds: u64) -> Self {
        self.duration_limit = seconds;
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_cookie_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.duration_limit, 10800);
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.ytdlp_path.is_none());
    }

    #[test]
    fn test_builders() {
        let config = ServiceConfig::default()
            .with_duration_limit(600)
            .with_timeout(5)
            .with_ytdlp_path(Some("/usr/bin/yt-dlp".to_string()))
            .with_cookie_path(None);

        assert_eq!(config.duration_limit, 600);
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.ytdlp_path.as_deref(), Some("/usr/bin/yt-dlp"));
        assert!(config.cookie_path.is_none());
    }

    #[test]
    fn test_invalid_value_message() {
        let err = ConfigError::InvalidValue {
            name: "DURATION_LIMIT",
            value: "ten".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for DURATION_LIMIT: \"ten\"");
    }
}

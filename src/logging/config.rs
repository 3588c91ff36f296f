use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Logging settings read from ENVIRONMENT, LOG_LEVEL and LOG_DIR
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub environment: String,
    pub level: LogLevel,
    pub directory: String,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("ENVIRONMENT").ok(),
            std::env::var("LOG_LEVEL").ok(),
            std::env::var("LOG_DIR").ok(),
        )
    }

    /// Production defaults to `info`, everything else to `debug`. An
    /// unparsable LOG_LEVEL falls back to the default.
    pub fn from_values(
        environment: Option<String>,
        level: Option<String>,
        directory: Option<String>,
    ) -> Self {
        let environment = environment.unwrap_or_else(|| "development".to_string());
        let default_level = if environment == "production" {
            LogLevel::Info
        } else {
            LogLevel::Debug
        };

        Self {
            level: level
                .and_then(|l| l.parse().ok())
                .unwrap_or(default_level),
            directory: directory.unwrap_or_else(|| "logs".to_string()),
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// `EnvFilter` directive used when RUST_LOG is not set
    pub fn filter_directive(&self) -> String {
        format!(
            "artistic_nav_backend={},tower_http=debug,axum=debug,sqlx=warn",
            self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_depend_on_environment() {
        let dev = LogSettings::from_values(None, None, None);
        assert_eq!(dev.level, LogLevel::Debug);
        assert_eq!(dev.directory, "logs");
        assert!(!dev.is_production());

        let prod = LogSettings::from_values(Some("production".into()), None, None);
        assert_eq!(prod.level, LogLevel::Info);
        assert!(prod.is_production());
    }

    #[test]
    fn test_explicit_level_wins_unless_invalid() {
        let s = LogSettings::from_values(None, Some("WARN".into()), None);
        assert_eq!(s.level, LogLevel::Warn);

        let s = LogSettings::from_values(Some("production".into()), Some("loud".into()), None);
        assert_eq!(s.level, LogLevel::Info);
    }

    #[test]
    fn test_filter_directive_targets_crate() {
        let s = LogSettings::from_values(None, Some("error".into()), None);
        assert!(s.filter_directive().starts_with("artistic_nav_backend=error"));
    }
}

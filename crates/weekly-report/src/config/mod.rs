use crate::workflows::report::{ReportSettings, ReportVocabulary, WeekRange, DEFAULT_PAGE_SIZE};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            report: ReportConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where tasks come from and how the report reads them.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// CSV export used when a caller does not supply table data inline.
    pub table_path: Option<PathBuf>,
    pub default_range: WeekRange,
    pub settings: ReportSettings,
}

impl ReportConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let table_path = env::var("REPORT_TABLE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let page_size = match env::var("REPORT_PAGE_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPageSize { value: raw })?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        let vocabulary = match env::var("REPORT_VOCABULARY") {
            Ok(code) => {
                ReportVocabulary::from_code(&code).ok_or(ConfigError::UnknownVocabulary { code })?
            }
            Err(_) => ReportVocabulary::default(),
        };

        let fallback = WeekRange::default();
        let start = week_from_env("REPORT_START_WEEK", fallback.start)?;
        let end = week_from_env("REPORT_END_WEEK", fallback.end)?;

        Ok(Self {
            table_path,
            default_range: WeekRange::new(start, end),
            settings: ReportSettings {
                page_size,
                vocabulary,
                ..ReportSettings::default()
            },
        })
    }
}

fn week_from_env(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidWeek { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPageSize { value: String },
    InvalidWeek { key: &'static str, value: String },
    UnknownVocabulary { code: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPageSize { value } => {
                write!(f, "REPORT_PAGE_SIZE must be a positive integer, got '{value}'")
            }
            ConfigError::InvalidWeek { key, value } => {
                write!(f, "{key} must be a whole week number, got '{value}'")
            }
            ConfigError::UnknownVocabulary { code } => {
                write!(f, "REPORT_VOCABULARY '{code}' is not one of: en, zh")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidPageSize { .. }
            | ConfigError::InvalidWeek { .. }
            | ConfigError::UnknownVocabulary { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "REPORT_TABLE_PATH",
            "REPORT_PAGE_SIZE",
            "REPORT_VOCABULARY",
            "REPORT_START_WEEK",
            "REPORT_END_WEEK",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.report.table_path.is_none());
        assert_eq!(config.report.default_range, WeekRange::new(1, 52));
        assert_eq!(config.report.settings, ReportSettings::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn reads_report_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REPORT_TABLE_PATH", "/tmp/tasks.csv");
        env::set_var("REPORT_PAGE_SIZE", "50");
        env::set_var("REPORT_VOCABULARY", "zh");
        env::set_var("REPORT_START_WEEK", "10");
        env::set_var("REPORT_END_WEEK", "12");

        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.report.table_path, Some(PathBuf::from("/tmp/tasks.csv")));
        assert_eq!(config.report.settings.page_size, 50);
        assert_eq!(config.report.settings.vocabulary.other_group, "其他");
        assert_eq!(config.report.default_range, WeekRange::new(10, 12));
    }

    #[test]
    fn rejects_zero_page_size_and_unknown_vocabulary() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REPORT_PAGE_SIZE", "0");
        let error = AppConfig::load().expect_err("zero page size rejected");
        assert!(matches!(error, ConfigError::InvalidPageSize { .. }));

        reset_env();
        env::set_var("REPORT_VOCABULARY", "klingon");
        let error = AppConfig::load().expect_err("unknown vocabulary rejected");
        reset_env();
        assert!(matches!(error, ConfigError::UnknownVocabulary { .. }));
    }
}

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::appointments::MAX_HORIZON_DAYS;

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

/// Top-level configuration for the platform.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scheduling: SchedulingConfig,
    pub reporting: ReportingConfig,
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
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let increment_minutes = numeric_var("SCHEDULING_INCREMENT_MINUTES", 30, 5, 240)?;
        if 1440 % increment_minutes != 0 {
            return Err(ConfigError::OutOfRange {
                var: "SCHEDULING_INCREMENT_MINUTES",
                value: increment_minutes.to_string(),
                expected: "a divisor of 1440",
            });
        }
        let horizon_days = numeric_var("SCHEDULING_HORIZON_DAYS", 30, 1, MAX_HORIZON_DAYS)?;
        let reminder_offsets = reminder_offsets_var()?;
        let cache_ttl_secs = numeric_var("REPORT_CACHE_TTL_SECS", 300, 0, 86_400)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            scheduling: SchedulingConfig {
                increment_minutes,
                horizon_days,
                reminder_offsets,
            },
            reporting: ReportingConfig { cache_ttl_secs },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
                format: LogFormat::Compact,
            },
            scheduling: SchedulingConfig::default(),
            reporting: ReportingConfig::default(),
        }
    }
}

fn numeric_var(var: &'static str, default: u32, min: u32, max: u32) -> Result<u32, ConfigError> {
    let raw = match env::var(var) {
        Ok(raw) => raw,
        Err(_) => return Ok(default),
    };
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidNumber {
            var,
            value: raw.clone(),
        })?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            var,
            value: raw,
            expected: "a value inside the supported range",
        });
    }
    Ok(value)
}

fn reminder_offsets_var() -> Result<Vec<u32>, ConfigError> {
    let raw = match env::var("SCHEDULING_REMINDER_OFFSETS") {
        Ok(raw) => raw,
        Err(_) => return Ok(SchedulingConfig::default().reminder_offsets),
    };

    let mut offsets = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let minutes = part
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "SCHEDULING_REMINDER_OFFSETS",
                value: part.to_string(),
            })?;
        offsets.push(minutes);
    }
    offsets.sort_unstable();
    offsets.dedup();
    Ok(offsets)
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

/// Output layout of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" | "pretty" => Self::Full,
            _ => Self::Compact,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Appointment availability and reminder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingConfig {
    pub increment_minutes: u32,
    pub horizon_days: u32,
    pub reminder_offsets: Vec<u32>,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            increment_minutes: 30,
            horizon_days: 30,
            reminder_offsets: vec![60, 1440],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingConfig {
    pub cache_ttl_secs: u32,
}

impl ReportingConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_ttl_secs))
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidNumber {
        var: &'static str,
        value: String,
    },
    OutOfRange {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a non-negative integer (found '{value}')")
            }
            ConfigError::OutOfRange {
                var,
                value,
                expected,
            } => write!(f, "{var}={value} is invalid: expected {expected}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::OutOfRange { .. } => None,
        }
    }
}

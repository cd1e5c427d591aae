//! Application configuration loaded from environment variables.

use std::path::{Path, PathBuf};

use booking::{BookingPolicy, Trip};
use inventory::ExpiryPolicy;
use thiserror::Error;

/// Errors raised while loading startup data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse trips from {path}: {source}")]
    Trips {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Upper bound on any configured duration: one year.
const MAX_DURATION_SECONDS: i64 = 366 * 24 * 60 * 60;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `HOLD_TTL_SECONDS`: hold lifetime when the client names none (default: `900`)
/// - `MAX_HOLD_TTL_SECONDS`: upper bound on any hold (default: `1800`)
/// - `PENDING_BOOKING_TTL_SECONDS`: payment window (default: `900`)
/// - `CANCELLATION_DEADLINE_HOURS`: no-cancel window before departure (default: `24`)
/// - `FULL_REFUND_HOURS`: full refund at least this early (default: `72`)
/// - `PARTIAL_REFUND_PERCENT`: refund share otherwise (default: `50`)
/// - `REAPER_INTERVAL_SECONDS`: expiry sweep period (default: `30`)
/// - `TRIPS_FILE`: JSON array of trips to seed the catalog (optional)
///
/// Unparseable values, and durations that are not positive or exceed one
/// year, fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub hold_ttl_seconds: i64,
    pub max_hold_ttl_seconds: i64,
    pub pending_booking_ttl_seconds: i64,
    pub cancellation_deadline_hours: i64,
    pub full_refund_hours: i64,
    pub partial_refund_percent: u8,
    pub reaper_interval_seconds: u64,
    pub trips_file: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let bounded = |key: &str, default: i64, unit: i64| {
            lookup(key)
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0 && *v <= MAX_DURATION_SECONDS / unit)
                .unwrap_or(default)
        };
        let seconds = |key: &str, default: i64| bounded(key, default, 1);
        let hours = |key: &str, default: i64| bounded(key, default, 60 * 60);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            hold_ttl_seconds: seconds("HOLD_TTL_SECONDS", defaults.hold_ttl_seconds),
            max_hold_ttl_seconds: seconds("MAX_HOLD_TTL_SECONDS", defaults.max_hold_ttl_seconds),
            pending_booking_ttl_seconds: seconds(
                "PENDING_BOOKING_TTL_SECONDS",
                defaults.pending_booking_ttl_seconds,
            ),
            cancellation_deadline_hours: hours(
                "CANCELLATION_DEADLINE_HOURS",
                defaults.cancellation_deadline_hours,
            ),
            full_refund_hours: hours("FULL_REFUND_HOURS", defaults.full_refund_hours),
            partial_refund_percent: lookup("PARTIAL_REFUND_PERCENT")
                .and_then(|v| v.parse::<u8>().ok())
                .filter(|v| *v <= 100)
                .unwrap_or(defaults.partial_refund_percent),
            reaper_interval_seconds: seconds(
                "REAPER_INTERVAL_SECONDS",
                defaults.reaper_interval_seconds as i64,
            ) as u64,
            trips_file: lookup("TRIPS_FILE").map(PathBuf::from),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn hold_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.hold_ttl_seconds)
    }

    pub fn reaper_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reaper_interval_seconds)
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(chrono::Duration::seconds(self.max_hold_ttl_seconds))
    }

    pub fn booking_policy(&self) -> BookingPolicy {
        BookingPolicy {
            cancellation_deadline: chrono::Duration::hours(self.cancellation_deadline_hours),
            full_refund_before: chrono::Duration::hours(self.full_refund_hours),
            partial_refund_percent: self.partial_refund_percent,
            pending_ttl: chrono::Duration::seconds(self.pending_booking_ttl_seconds),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            hold_ttl_seconds: 900,
            max_hold_ttl_seconds: 1800,
            pending_booking_ttl_seconds: 900,
            cancellation_deadline_hours: 24,
            full_refund_hours: 72,
            partial_refund_percent: 50,
            reaper_interval_seconds: 30,
            trips_file: None,
        }
    }
}

/// Reads the seed trips from a JSON file.
pub fn load_trips(path: &Path) -> Result<Vec<Trip>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Trips {
        path: path.to_path_buf(),
        source,
    })
}

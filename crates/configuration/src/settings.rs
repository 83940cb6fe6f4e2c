use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub warehouse: WarehouseSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

impl Config {
    /// Resolves the report reference date. An explicit override (the CLI's
    /// `--as-of` flag) wins over `report.as_of` from the config file; if
    /// neither is present the run is rejected, because reports never read
    /// the system clock.
    pub fn resolve_as_of(&self, override_date: Option<NaiveDate>) -> Result<NaiveDate, ConfigError> {
        override_date.or(self.report.as_of).ok_or_else(|| {
            ConfigError::ValidationError(
                "no report date: pass --as-of YYYY-MM-DD or set report.as_of in config.toml"
                    .to_string(),
            )
        })
    }
}

/// Connection settings for the warehouse database.
///
/// The connection URL itself is not configured here; it comes from the
/// `DATABASE_URL` environment variable (usually via `.env`), keeping
/// credentials out of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseSettings {
    /// Maximum number of pooled Postgres connections.
    pub max_connections: u32,
    /// Seconds to wait when acquiring a connection before giving up.
    pub acquire_timeout_secs: u64,
}

/// Settings that shape report output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// The reference date for age and recency calculations, used when the
    /// `--as-of` flag is absent.
    pub as_of: Option<NaiveDate>,
    /// Default row count for the ranking report when `--limit` is not given.
    pub top_n: Option<usize>,
}

// --- Default Implementations ---
// These allow a user to omit the `[warehouse]` section from their toml
// and still have it work with sensible defaults.

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

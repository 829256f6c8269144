//! Startup configuration from the environment.
//!
//! Required: `MQTT_HOST`, `MQTT_PORT`, `MQTT_USER`, `MQTT_PASSWORD` and
//! `URLS` (comma separated schedule page URLs). Optional: `MQTT_NODE_ID`,
//! `DATA_DIR`, `SCRAPE_INTERVAL_SECS`, `TIMETABLE_INTERVAL_SECS`,
//! `DEPARTURE_INTERVAL_SECS` and `HTTP_TIMEOUT_SECS`.
//!
//! An empty variable is treated as unset.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{InvalidRouteKey, RouteSource};
use crate::publish::MqttConfig;
use crate::runner::Intervals;
use crate::scrape::ScraperConfig;
use crate::store::StoreCacheConfig;

/// Default directory for timetable files.
const DEFAULT_DATA_DIR: &str = "data";

/// Errors in the startup configuration. All of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("invalid route URL {url}: {source}")]
    Route {
        url: String,
        #[source]
        source: InvalidRouteKey,
    },
}

/// Everything the service needs to start.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub mqtt: MqttConfig,
    pub routes: Vec<RouteSource>,
    pub data_dir: PathBuf,
    pub intervals: Intervals,
    pub scraper: ScraperConfig,
    pub cache: StoreCacheConfig,
}

impl ServiceConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        let mut mqtt = MqttConfig::new(
            vars.required("MQTT_HOST")?,
            vars.parsed_required("MQTT_PORT")?,
            vars.required("MQTT_USER")?,
            vars.required("MQTT_PASSWORD")?,
        );
        if let Some(node_id) = vars.optional("MQTT_NODE_ID") {
            mqtt = mqtt.with_node_id(node_id);
        }

        let routes = parse_routes(&vars.required("URLS")?)?;

        let data_dir = vars
            .optional("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let defaults = Intervals::default();
        let intervals = Intervals {
            scrape: vars.interval("SCRAPE_INTERVAL_SECS", defaults.scrape)?,
            timetables: vars.interval("TIMETABLE_INTERVAL_SECS", defaults.timetables)?,
            departures: vars.interval("DEPARTURE_INTERVAL_SECS", defaults.departures)?,
        };

        let mut scraper = ScraperConfig::default();
        if let Some(timeout) = vars.parsed_optional::<u64>("HTTP_TIMEOUT_SECS")? {
            if timeout == 0 {
                return Err(ConfigError::Invalid {
                    name: "HTTP_TIMEOUT_SECS",
                    reason: "must be greater than zero".to_string(),
                });
            }
            scraper = scraper.with_timeout(timeout);
        }

        Ok(Self {
            mqtt,
            routes,
            data_dir,
            intervals,
            scraper,
            cache: StoreCacheConfig::default(),
        })
    }

    /// Set the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the job intervals.
    pub fn with_intervals(mut self, intervals: Intervals) -> Self {
        self.intervals = intervals;
        self
    }
}

/// Parse a comma separated URL list, ignoring blank items.
fn parse_routes(urls: &str) -> Result<Vec<RouteSource>, ConfigError> {
    let routes = urls
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| {
            RouteSource::parse(url).map_err(|source| ConfigError::Route {
                url: url.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if routes.is_empty() {
        return Err(ConfigError::Missing("URLS"));
    }
    Ok(routes)
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &'static str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed_optional<T>(&self, name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|value| {
                value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                    name,
                    reason: format!("{value:?}: {e}"),
                })
            })
            .transpose()
    }

    fn parsed_required<T>(&self, name: &'static str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parsed_optional(name)?.ok_or(ConfigError::Missing(name))
    }

    fn interval(&self, name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        match self.parsed_optional::<u64>(name)? {
            None => Ok(default),
            Some(0) => Err(ConfigError::Invalid {
                name,
                reason: "must be greater than zero".to_string(),
            }),
            Some(secs) => Ok(Duration::from_secs(secs)),
        }
    }
}

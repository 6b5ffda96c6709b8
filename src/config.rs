/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub dispatch: DispatchConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
}

/**
 * Building and fleet tunables used by the dispatcher and the movers.
 *
 * # Fields
 * - `floor_count`:         Number of floors. Valid request floors are `1..=floor_count`.
 * - `car_count`:           Fleet size. Cars get ids `1..=car_count` and start at floor 1.
 * - `travel_time_ms`:      Simulated time spent travelling one floor.
 * - `door_dwell_time_ms`:  Simulated time a car stays at a stop.
 * - `store_retries`:       Extra attempts for a failed store write before a drive gives up.
 * - `request_expiry_ms`:   Optional age after which a queued request is dropped. Must be positive.
 */
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    pub floor_count: i32,
    pub car_count: u32,
    pub travel_time_ms: u64,
    pub door_dwell_time_ms: u64,
    pub store_retries: u32,
    pub request_expiry_ms: Option<u64>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub seed: Option<u64>,
    pub request_limit: Option<u32>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            floor_count: 10,
            car_count: 4,
            travel_time_ms: 10_000,
            door_dwell_time_ms: 10_000,
            store_retries: 3,
            request_expiry_ms: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            min_interval_ms: 5_000,
            max_interval_ms: 15_000,
            seed: None,
            request_limit: None,
        }
    }
}

impl DispatchConfig {
    pub fn travel_time(&self) -> Duration {
        Duration::from_millis(self.travel_time_ms)
    }

    pub fn door_dwell_time(&self) -> Duration {
        Duration::from_millis(self.door_dwell_time_ms)
    }

    pub fn request_expiry(&self) -> Option<Duration> {
        self.request_expiry_ms.map(Duration::from_millis)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.floor_count < 1 {
            return Err(ConfigError::Invalid(format!(
                "floor_count must be at least 1, got {}",
                self.dispatch.floor_count
            )));
        }
        if self.dispatch.car_count < 1 {
            return Err(ConfigError::Invalid("car_count must be at least 1".into()));
        }
        if self.dispatch.request_expiry_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "request_expiry_ms must be positive, leave it unset to keep requests queued".into(),
            ));
        }
        if self.simulation.min_interval_ms > self.simulation.max_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "min_interval_ms ({}) exceeds max_interval_ms ({})",
                self.simulation.min_interval_ms, self.simulation.max_interval_ms
            )));
        }
        Ok(())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(config_str)?)
}

/// Loads the configuration file, falling back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    match fs::read_to_string(path) {
        Ok(config_str) => parse_config(&config_str),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("{} not found, using default configuration", path.display());
            Ok(Config::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: path.display().to_string(),
            source,
        }),
    }
}

use chrono::NaiveDate;
use config::{Config, ConfigError};
use serde::Deserialize;
use tracing::debug;

use crate::dates::DateTokenStyle;
use crate::naming::{AliasEntry, default_aliases};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_data_config")]
    pub data: DataConfig,
    #[serde(default = "default_date_config")]
    pub date: DateConfig,
    #[serde(default = "default_cache_config")]
    pub cache: CacheConfig,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_aliases")]
    pub aliases: Vec<AliasEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,
    #[serde(default = "default_source_url")]
    pub source_url: String,
    /// First recorded date in the source dataset.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DateConfig {
    /// Date-column naming convention of the backing tables. An explicit
    /// setting, never inferred from the host platform.
    #[serde(default = "default_token_style")]
    pub token_style: DateTokenStyle,
    #[serde(default = "default_probe_attempts")]
    pub probe_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_data_config() -> DataConfig {
    DataConfig {
        dir: default_data_dir(),
        source_url: default_source_url(),
        start_date: default_start_date(),
    }
}

fn default_date_config() -> DateConfig {
    DateConfig {
        token_style: default_token_style(),
        probe_attempts: default_probe_attempts(),
    }
}

fn default_cache_config() -> CacheConfig {
    CacheConfig {
        ttl_secs: default_cache_ttl_secs(),
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_source_url() -> String {
    "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_{category}_global.csv"
        .to_string()
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 22).expect("valid dataset epoch")
}

fn default_token_style() -> DateTokenStyle {
    DateTokenStyle::Unpadded
}

fn default_probe_attempts() -> u32 {
    5
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_api_port() -> u16 {
    3000
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("APP"));

        // Build the configuration
        let config = builder.build()?;

        // Try to deserialize the entire configuration
        let settings: Settings = config.try_deserialize()?;

        debug!(
            dir = %settings.data.dir,
            start_date = %settings.data.start_date,
            probe_attempts = settings.date.probe_attempts,
            "Parsed settings"
        );

        Ok(settings)
    }
}

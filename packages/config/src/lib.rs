#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Collector configuration loading and validation.
//!
//! A run is described by a small JSON (or TOML) document naming the API
//! endpoint plus optional query filters, the columns to keep, and pacing
//! parameters. Only `api_endpoint` is required; every other field falls
//! back to a default that means "no filter" or "no override".
//!
//! ```json
//! {
//!   "api_endpoint": "https://data.cdc.gov/resource/5xkq-dg7x.json",
//!   "year": 2023,
//!   "state": "OH",
//!   "columns": ["year", "state", "illnesses"],
//!   "base_delay": 1.5
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Label used in output file names when `state` or `year` is not set.
pub const UNSET_LABEL: &str = "all";

/// Errors that can occur while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration source does not exist.
    #[error("Config file '{}' not found", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Reading the file failed.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required field is missing or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field is present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters for one collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Base URL of the dataset endpoint.
    #[serde(default)]
    pub api_endpoint: String,
    /// Year filter, sent as the `year` query parameter. Integers and
    /// strings are both accepted and kept as text.
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<String>,
    /// State or region filter, sent as the `state` query parameter.
    #[serde(default)]
    pub state: Option<String>,
    /// Columns to keep, in order. Empty means every field is kept.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Base inter-request delay in seconds.
    #[serde(default = "default_base_delay")]
    pub base_delay: f64,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory all output files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Prefix of the records file (`<prefix>_<state>_<year>.json`).
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    /// Dot-separated path to the record array when the API wraps it in an
    /// object (e.g. `"data.items"`). `None` means a bare array.
    #[serde(default)]
    pub data_path: Option<String>,
    /// Name recorded as the collector in the metadata document.
    #[serde(default)]
    pub collector: Option<String>,
    /// Lower clamp for the adaptive delay multiplier.
    #[serde(default = "default_min_multiplier")]
    pub min_multiplier: f64,
    /// Upper clamp for the adaptive delay multiplier.
    #[serde(default = "default_max_multiplier")]
    pub max_multiplier: f64,
}

const fn default_base_delay() -> f64 {
    1.0
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_prefix() -> String {
    "cdc".to_string()
}

const fn default_min_multiplier() -> f64 {
    0.1
}

const fn default_max_multiplier() -> f64 {
    16.0
}

/// Year values show up both as `2023` and `"2023"` in hand-written configs.
#[derive(Deserialize)]
#[serde(untagged)]
enum YearValue {
    Number(i64),
    Text(String),
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<YearValue>::deserialize(deserializer)?.map(|value| match value {
            YearValue::Number(n) => n.to_string(),
            YearValue::Text(s) => s,
        }),
    )
}

impl CollectorConfig {
    /// Creates a configuration for `api_endpoint` with every optional field
    /// at its default.
    #[must_use]
    pub fn new(api_endpoint: &str) -> Self {
        Self {
            api_endpoint: api_endpoint.to_owned(),
            year: None,
            state: None,
            columns: Vec::new(),
            base_delay: default_base_delay(),
            timeout_secs: default_timeout_secs(),
            output_dir: default_output_dir(),
            output_prefix: default_output_prefix(),
            data_path: None,
            collector: None,
            min_multiplier: default_min_multiplier(),
            max_multiplier: default_max_multiplier(),
        }
    }

    /// Sets the year filter.
    #[must_use]
    pub fn with_year(mut self, year: &str) -> Self {
        self.year = Some(year.to_owned());
        self
    }

    /// Sets the state filter.
    #[must_use]
    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_owned());
        self
    }

    /// Sets the columns to keep.
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the base delay in seconds.
    #[must_use]
    pub const fn with_base_delay(mut self, seconds: f64) -> Self {
        self.base_delay = seconds;
        self
    }

    /// Sets the path to the record array inside a wrapped response.
    #[must_use]
    pub fn with_data_path(mut self, path: &str) -> Self {
        self.data_path = Some(path.to_owned());
        self
    }

    /// `state` for use in file names and headings.
    #[must_use]
    pub fn state_label(&self) -> &str {
        self.state.as_deref().unwrap_or(UNSET_LABEL)
    }

    /// `year` for use in file names and headings.
    #[must_use]
    pub fn year_label(&self) -> &str {
        self.year.as_deref().unwrap_or(UNSET_LABEL)
    }

    /// Checks required fields and value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if `api_endpoint` is blank, or
    /// [`ConfigError::Invalid`] if a numeric field is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("api_endpoint"));
        }
        if !self.base_delay.is_finite() || self.base_delay < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "base_delay must be a non-negative number of seconds, got {}",
                self.base_delay
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !(self.min_multiplier.is_finite() && self.min_multiplier > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_multiplier must be positive, got {}",
                self.min_multiplier
            )));
        }
        if !self.max_multiplier.is_finite() || self.min_multiplier > self.max_multiplier {
            return Err(ConfigError::Invalid(format!(
                "multiplier range [{}, {}] is empty",
                self.min_multiplier, self.max_multiplier
            )));
        }
        Ok(())
    }
}

/// Parses and validates a JSON configuration document.
///
/// # Errors
///
/// Returns [`ConfigError`] if the document is malformed or fails
/// [`CollectorConfig::validate`].
pub fn parse_json(contents: &str) -> Result<CollectorConfig, ConfigError> {
    let config: CollectorConfig = serde_json::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Parses and validates a TOML configuration document.
///
/// # Errors
///
/// Returns [`ConfigError`] if the document is malformed or fails
/// [`CollectorConfig::validate`].
pub fn parse_toml(contents: &str) -> Result<CollectorConfig, ConfigError> {
    let config: CollectorConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration at `path`.
///
/// Files ending in `.toml` are parsed as TOML, everything else as JSON.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if `path` does not exist. Callers
/// must treat this as fatal. Other variants report unreadable or invalid
/// documents.
pub fn load_config(path: &Path) -> Result<CollectorConfig, ConfigError> {
    if !path.exists() {
        log::error!("Config file '{}' not found", path.display());
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config = if is_toml {
        parse_toml(&contents)?
    } else {
        parse_json(&contents)?
    };

    log::info!("Config loaded from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_json_config() {
        let config = parse_json(
            r#"{
                "api_endpoint": "https://x",
                "year": 2023,
                "state": "OH",
                "columns": ["year", "state", "deaths"],
                "base_delay": 2
            }"#,
        )
        .unwrap();

        assert_eq!(config.api_endpoint, "https://x");
        assert_eq!(config.year.as_deref(), Some("2023"));
        assert_eq!(config.state.as_deref(), Some("OH"));
        assert_eq!(config.columns, ["year", "state", "deaths"]);
        assert!((config.base_delay - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_string_year() {
        let config = parse_json(r#"{"api_endpoint": "https://x", "year": "2019"}"#).unwrap();
        assert_eq!(config.year.as_deref(), Some("2019"));
    }

    #[test]
    fn optional_fields_default() {
        let config = parse_json(r#"{"api_endpoint": "https://x"}"#).unwrap();
        assert_eq!(config.year, None);
        assert_eq!(config.state, None);
        assert!(config.columns.is_empty());
        assert!((config.base_delay - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.output_prefix, "cdc");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.state_label(), "all");
        assert_eq!(config.year_label(), "all");
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let err = parse_json(r#"{"year": 2023, "state": "OH"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("api_endpoint")));
    }

    #[test]
    fn blank_endpoint_is_rejected() {
        let err = parse_json(r#"{"api_endpoint": "   "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("api_endpoint")));
    }

    #[test]
    fn negative_delay_is_rejected() {
        let err = parse_json(r#"{"api_endpoint": "https://x", "base_delay": -1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn inverted_multiplier_range_is_rejected() {
        let err = parse_json(
            r#"{"api_endpoint": "https://x", "min_multiplier": 4.0, "max_multiplier": 2.0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn parses_toml_config() {
        let config = parse_toml(
            r#"
            api_endpoint = "https://x"
            year = 2021
            state = "CA"
            columns = ["year", "illnesses"]
            "#,
        )
        .unwrap();
        assert_eq!(config.year.as_deref(), Some("2021"));
        assert_eq!(config.columns, ["year", "illnesses"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn loads_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, r#"{"api_endpoint": "https://json"}"#).unwrap();
        assert_eq!(load_config(&json_path).unwrap().api_endpoint, "https://json");

        let toml_path = dir.path().join("config.toml");
        std::fs::write(&toml_path, "api_endpoint = \"https://toml\"\n").unwrap();
        assert_eq!(load_config(&toml_path).unwrap().api_endpoint, "https://toml");
    }
}

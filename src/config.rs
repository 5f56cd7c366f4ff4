//! Loading [`SchedulerConfig`] from the environment or JSON.

use std::time::Duration;

use thiserror::Error;
use waterfiber_core::SchedulerConfig;

/// Environment variable overriding the yield floor, in (possibly fractional) milliseconds.
pub const YIELD_FLOOR_ENV: &str = "WATERFIBER_YIELD_FLOOR_MS";

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The yield floor was not a non-negative finite number.
    #[error("invalid {YIELD_FLOOR_ENV} value `{value}`")]
    InvalidYieldFloor {
        /// The raw value.
        value: String,
    },
    /// The JSON document did not describe a configuration.
    #[error("invalid scheduler configuration")]
    Json(#[from] serde_json::Error),
}

/// Reads the scheduler configuration from the process environment.
///
/// # Errors
///
/// Fails when [`YIELD_FLOOR_ENV`] is set to something that is not a non-negative number.
pub fn scheduler_config_from_env() -> Result<SchedulerConfig, ConfigError> {
    scheduler_config_from_lookup(|key| std::env::var(key).ok())
}

/// Like [`scheduler_config_from_env`], with an explicit variable lookup.
///
/// # Errors
///
/// Fails when [`YIELD_FLOOR_ENV`] is set to something that is not a non-negative number.
pub fn scheduler_config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SchedulerConfig, ConfigError> {
    let config = SchedulerConfig::default();
    let Some(raw) = lookup(YIELD_FLOOR_ENV) else {
        return Ok(config);
    };
    let millis = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|millis| millis.is_finite() && *millis >= 0.0)
        .ok_or(ConfigError::InvalidYieldFloor { value: raw.clone() })?;
    Ok(config.with_yield_floor(Duration::from_secs_f64(millis / 1000.0)))
}

/// Parses a JSON configuration; missing fields keep their defaults.
///
/// # Errors
///
/// Fails on malformed JSON.
pub fn scheduler_config_from_json(json: &str) -> Result<SchedulerConfig, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_keeps_defaults() {
        let config = scheduler_config_from_lookup(|_| None).unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn yield_floor_is_read_in_milliseconds() {
        let config = scheduler_config_from_lookup(|key| {
            (key == YIELD_FLOOR_ENV).then(|| " 5 ".to_owned())
        })
        .unwrap();
        assert_eq!(config.yield_floor, Duration::from_millis(5));
    }

    #[test]
    fn rejects_garbage_and_negative_floors() {
        for raw in ["soon", "-1", "NaN"] {
            let err = scheduler_config_from_lookup(|_| Some(raw.to_owned())).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidYieldFloor { ref value } if value == raw));
        }
    }

    #[test]
    fn json_fills_missing_fields() {
        assert_eq!(
            scheduler_config_from_json("{}").unwrap(),
            SchedulerConfig::default()
        );
        let config =
            scheduler_config_from_json(r#"{"yield_floor":{"secs":0,"nanos":2000000}}"#).unwrap();
        assert_eq!(config.yield_floor, Duration::from_millis(2));
        assert!(scheduler_config_from_json("[").is_err());
    }
}

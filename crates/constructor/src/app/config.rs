use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use reality_engine::JourneyConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const CONFIG_ENV_VAR: &str = "REALITY_CONFIG";
pub(crate) const MAX_FPS_ENV_VAR: &str = "REALITY_MAX_FPS";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConfigFile {
    pub journey: JourneyConfig,
    pub max_render_fps: Option<u32>,
    pub show_overlay: bool,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value at {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub(crate) fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_json(&raw)
}

pub(crate) fn parse_config_json(raw: &str) -> Result<ConfigFile, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config: ConfigFile =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            let location = if path.is_empty() || path == "." {
                "root".to_string()
            } else {
                path
            };
            ConfigError::Parse {
                location,
                source: error.into_inner(),
            }
        })?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ConfigFile) -> Result<(), ConfigError> {
    let debounce = &config.journey.debounce;
    for (field, value) in [
        ("journey.debounce.coarse_threshold", debounce.coarse_threshold),
        ("journey.debounce.fine_threshold", debounce.fine_threshold),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Invalid {
                field,
                reason: format!("expected a non-negative number, got {value}"),
            });
        }
    }

    let orbit = &config.journey.orbit;
    if !(orbit.min_distance > 0.0 && orbit.min_distance.is_finite()) {
        return Err(ConfigError::Invalid {
            field: "journey.orbit.min_distance",
            reason: format!("expected a positive number, got {}", orbit.min_distance),
        });
    }
    if !(orbit.max_distance >= orbit.min_distance && orbit.max_distance.is_finite()) {
        return Err(ConfigError::Invalid {
            field: "journey.orbit.max_distance",
            reason: format!(
                "expected at least min_distance ({}), got {}",
                orbit.min_distance, orbit.max_distance
            ),
        });
    }
    if config.journey.point_budget == 0 {
        return Err(ConfigError::Invalid {
            field: "journey.point_budget",
            reason: "expected at least one point".to_string(),
        });
    }
    Ok(())
}

/// Defaults, then the file named by `REALITY_CONFIG`, then `REALITY_MAX_FPS`.
/// Unreadable or invalid sources are logged and skipped.
pub(crate) fn resolve_config_from_env() -> ConfigFile {
    let mut config = match env::var(CONFIG_ENV_VAR) {
        Ok(path) => match load_config_file(Path::new(&path)) {
            Ok(config) => {
                info!(env_var = CONFIG_ENV_VAR, path = path.as_str(), "config_loaded");
                config
            }
            Err(error) => {
                warn!(
                    env_var = CONFIG_ENV_VAR,
                    error = %error,
                    "invalid config file; falling back to defaults"
                );
                ConfigFile::default()
            }
        },
        Err(env::VarError::NotPresent) => ConfigFile::default(),
        Err(error) => {
            warn!(
                env_var = CONFIG_ENV_VAR,
                error = %error,
                "unable to read config env var; falling back to defaults"
            );
            ConfigFile::default()
        }
    };

    let raw_fps = env::var(MAX_FPS_ENV_VAR).ok();
    config.max_render_fps = resolve_max_fps(raw_fps.as_deref(), config.max_render_fps);
    config
}

/// `0` disables the cap; unparsable values keep the fallback.
pub(crate) fn resolve_max_fps(raw: Option<&str>, fallback: Option<u32>) -> Option<u32> {
    let Some(value) = raw else {
        return fallback;
    };
    match value.trim().parse::<u32>() {
        Ok(0) => None,
        Ok(fps) => Some(fps),
        Err(_) => {
            warn!(
                env_var = MAX_FPS_ENV_VAR,
                value,
                "invalid render fps cap; falling back to config"
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = parse_config_json("{}").expect("config");
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn partial_journey_override_keeps_other_defaults() {
        let raw = json!({
            "journey": { "debounce": { "cooldown_ms": 900 } },
            "max_render_fps": 120
        })
        .to_string();

        let config = parse_config_json(&raw).expect("config");

        assert_eq!(config.journey.debounce.cooldown_ms, 900);
        assert_eq!(
            config.journey.debounce.coarse_threshold,
            JourneyConfig::default().debounce.coarse_threshold
        );
        assert_eq!(config.max_render_fps, Some(120));
    }

    #[test]
    fn unknown_field_reports_its_path() {
        let raw = json!({ "journey": { "orbit": { "zoom": 2.0 } } }).to_string();

        let error = parse_config_json(&raw).expect_err("unknown field");

        match error {
            ConfigError::Parse { location, .. } => assert!(location.starts_with("journey.orbit")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_type_reports_nested_path() {
        let raw = json!({ "journey": { "point_budget": "lots" } }).to_string();

        let error = parse_config_json(&raw).expect_err("type mismatch");

        assert!(error.to_string().contains("journey.point_budget"));
    }

    #[test]
    fn inverted_orbit_limits_are_rejected() {
        let raw = json!({
            "journey": { "orbit": { "min_distance": 80.0, "max_distance": 10.0 } }
        })
        .to_string();

        let error = parse_config_json(&raw).expect_err("invalid");

        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "journey.orbit.max_distance",
                ..
            }
        ));
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let raw = json!({ "journey": { "debounce": { "fine_threshold": -1.0 } } }).to_string();
        assert!(matches!(
            parse_config_json(&raw),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn max_fps_override_rules() {
        assert_eq!(resolve_max_fps(None, Some(60)), Some(60));
        assert_eq!(resolve_max_fps(Some("144"), None), Some(144));
        assert_eq!(resolve_max_fps(Some("0"), Some(60)), None);
        assert_eq!(resolve_max_fps(Some("fast"), Some(60)), Some(60));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = load_config_file(Path::new("definitely/not/here.json")).expect_err("missing");
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}

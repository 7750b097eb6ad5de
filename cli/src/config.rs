//! Configuration loader for the vesting CLI.
//!
//! Layers (highest precedence last):
//!   1) Built-in defaults
//!   2) Config file (explicit path or auto-discovered)
//!   3) Environment variables (optionally via .env)

use std::path::{Path, PathBuf};

use config as cfg;
use directories::ProjectDirs;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Application config (validated).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telemetry: Telemetry,
    pub output: Output,
}

/// Logging.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// RUST_LOG-like directive, e.g. "warn,vesting_cli=debug".
    pub log_filter: String,
    /// JSON lines instead of human-readable text.
    pub json: bool,
    /// ANSI colours (text format only).
    pub ansi: bool,
}

/// Rendering of command results on stdout.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Pretty-print JSON.
    pub pretty: bool,
    /// Include chart series in `compute` results.
    pub include_series: bool,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            log_filter: "warn,vesting_cli=info".into(),
            json: false,
            ansi: true,
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self {
            pretty: true,
            include_series: true,
        }
    }
}

/// Errors during configuration loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[from] cfg::ConfigError),
    #[error("invalid log filter `{0}`")]
    InvalidLogFilter(String),
    #[error("path not found `{0}`")]
    PathNotFound(String),
}

/// Load configuration: defaults → file → environment.
/// Env prefix: `VESTING__...`, nested fields separated by `__`.
///
/// Examples:
///   VESTING__TELEMETRY__JSON=true
///   VESTING__OUTPUT__INCLUDE_SERIES=false
pub fn load(explicit_file: Option<&Path>) -> Result<Config, ConfigError> {
    // No-op if absent.
    let _ = dotenv();

    let defaults = Config::default();
    let mut builder = cfg::Config::builder()
        .set_default("telemetry.log_filter", defaults.telemetry.log_filter)?
        .set_default("telemetry.json", defaults.telemetry.json)?
        .set_default("telemetry.ansi", defaults.telemetry.ansi)?
        .set_default("output.pretty", defaults.output.pretty)?
        .set_default("output.include_series", defaults.output.include_series)?;

    for path in discover_config_files(explicit_file)? {
        builder = builder.add_source(cfg::File::from(path));
    }

    builder = builder.add_source(
        cfg::Environment::with_prefix("VESTING")
            .separator("__")
            .try_parsing(true),
    );

    let mut config: Config = builder.build()?.try_deserialize()?;
    validate_and_normalize(&mut config)?;
    Ok(config)
}

/// Config files in precedence order:
/// - explicit path if provided (must exist)
/// - $XDG_CONFIG_HOME/vesting-cli/config.{toml,yaml,yml,json}
/// - ./vesting.{toml,yaml,yml,json}
fn discover_config_files(explicit: Option<&Path>) -> Result<Vec<PathBuf>, ConfigError> {
    if let Some(p) = explicit {
        if p.exists() {
            return Ok(vec![p.to_path_buf()]);
        }
        return Err(ConfigError::PathNotFound(p.display().to_string()));
    }

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(pd) = ProjectDirs::from("io", "Vesting", "vesting-cli") {
        let cd = pd.config_dir();
        for ext in ["toml", "yaml", "yml", "json"] {
            candidates.push(cd.join(format!("config.{ext}")));
        }
    }
    for ext in ["toml", "yaml", "yml", "json"] {
        candidates.push(PathBuf::from(format!("vesting.{ext}")));
    }

    Ok(candidates.into_iter().filter(|c| c.exists()).collect())
}

fn validate_and_normalize(config: &mut Config) -> Result<(), ConfigError> {
    let filter = config.telemetry.log_filter.trim();
    config.telemetry.log_filter = if filter.is_empty() {
        Telemetry::default().log_filter
    } else {
        filter.to_string()
    };

    EnvFilter::try_new(&config.telemetry.log_filter)
        .map_err(|_| ConfigError::InvalidLogFilter(config.telemetry.log_filter.clone()))?;

    if config.telemetry.json {
        config.telemetry.ansi = false;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_valid() {
        let mut config = Config::default();
        assert!(validate_and_normalize(&mut config).is_ok());
        assert!(config.output.pretty);
        assert!(config.output.include_series);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vesting.toml");
        fs::write(
            &path,
            "[telemetry]\nlog_filter = \"debug\"\njson = true\n\n[output]\ninclude_series = false\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.telemetry.log_filter, "debug");
        assert!(config.telemetry.json);
        // JSON logs never carry colour codes.
        assert!(!config.telemetry.ansi);
        assert!(!config.output.include_series);
        assert!(config.output.pretty);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(load(Some(&path)), Err(ConfigError::PathNotFound(_))));
    }

    #[test]
    fn log_filter_is_validated() {
        let mut config = Config::default();
        config.telemetry.log_filter = "vesting_cli=loud".into();
        assert!(matches!(
            validate_and_normalize(&mut config),
            Err(ConfigError::InvalidLogFilter(_))
        ));

        config.telemetry.log_filter = "   ".into();
        assert!(validate_and_normalize(&mut config).is_ok());
        assert_eq!(config.telemetry.log_filter, Telemetry::default().log_filter);
    }
}

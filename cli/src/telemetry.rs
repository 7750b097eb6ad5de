//! Logging bootstrap.
//!
//! - Text or JSON lines on stderr (stdout carries command results).
//! - RFC 3339 UTC timestamps.
//! - EnvFilter from config, falling back to RUST_LOG, then "info".

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::Telemetry;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive; `None` reads RUST_LOG.
    pub env_filter: Option<String>,
    pub json: bool,
    /// Print target and source location.
    pub with_targets_and_lines: bool,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            json: false,
            with_targets_and_lines: false,
            ansi: true,
        }
    }
}

impl From<&Telemetry> for LoggingConfig {
    fn from(t: &Telemetry) -> Self {
        Self {
            env_filter: Some(t.log_filter.clone()),
            json: t.json,
            with_targets_and_lines: t.json,
            ansi: t.ansi,
        }
    }
}

/// Install the global subscriber. Call once at process start.
pub fn init(cfg: LoggingConfig) -> anyhow::Result<()> {
    let filter = match &cfg.env_filter {
        Some(s) => EnvFilter::try_new(s.as_str())?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let fmt_layer = {
        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(cfg.with_targets_and_lines)
            .with_file(cfg.with_targets_and_lines)
            .with_line_number(cfg.with_targets_and_lines)
            .with_timer(fmt::time::ChronoUtc::rfc_3339());

        if cfg.json {
            base.json()
                .with_ansi(false)
                .with_current_span(true)
                .flatten_event(true)
                .boxed()
        } else {
            base.with_ansi(cfg.ansi).boxed()
        }
    };

    Registry::default().with(filter).with(fmt_layer).try_init()?;
    Ok(())
}

use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::{
    config::{LogFormat, LoggerConfig},
    error::LoggerError,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the process-wide subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInstalled`] if any global subscriber exists.
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = build_filter(cfg)?;
    let output = build_output(cfg)?;

    if tracing::dispatcher::has_been_set() {
        return Err(LoggerError::AlreadyInstalled);
    }
    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()
        .map_err(|e| LoggerError::Install(e.to_string()))?;

    tracing::debug!(format = %cfg.format, filter = %cfg.filter, "logger installed");
    Ok(())
}

fn build_filter(cfg: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    if cfg.env_override
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return Ok(filter);
    }
    EnvFilter::try_new(&cfg.filter).map_err(|e| LoggerError::InvalidFilter {
        filter: cfg.filter.clone(),
        reason: e.to_string(),
    })
}

fn build_output(cfg: &LoggerConfig) -> Result<BoxedLayer, LoggerError> {
    match cfg.format {
        LogFormat::Text => Ok(fmt::layer()
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(local_rfc3339())
            .boxed()),
        LogFormat::Json => Ok(fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(cfg.with_targets)
            .with_timer(local_rfc3339())
            .boxed()),
        LogFormat::Journald => journald_layer(),
    }
}

fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer() -> Result<BoxedLayer, LoggerError> {
    tracing_journald::layer()
        .map(|layer| layer.boxed())
        .map_err(|e| LoggerError::Install(format!("journald: {e}")))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer() -> Result<BoxedLayer, LoggerError> {
    Err(LoggerError::JournaldUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_filter_is_rejected() {
        let cfg = LoggerConfig::default()
            .with_filter("fuzzdup=loud")
            .without_env_override();
        assert!(matches!(
            init_logger(&cfg),
            Err(LoggerError::InvalidFilter { ref filter, .. }) if filter == "fuzzdup=loud"
        ));
    }

    #[test]
    fn only_one_logger_per_process() {
        let cfg = LoggerConfig::default()
            .with_filter("warn")
            .without_env_override();
        let first = init_logger(&cfg);
        let second = init_logger(&cfg.clone().with_format(LogFormat::Json));

        assert!(first.is_ok() || matches!(first, Err(LoggerError::AlreadyInstalled)));
        assert!(matches!(second, Err(LoggerError::AlreadyInstalled)));
    }
}

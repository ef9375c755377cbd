use std::{fmt, io::IsTerminal, str::FromStr};

use crate::error::LoggerError;

/// Output encoding of log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines on stdout.
    #[default]
    Text,
    /// One JSON object per event on stdout.
    Json,
    /// Native systemd journal fields.
    Journald,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "journald" | "journal" if journald_available() => Ok(LogFormat::Journald),
            "journald" | "journal" => Err(LoggerError::JournaldUnavailable),
            _ => Err(LoggerError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Journald => "journald",
        })
    }
}

#[inline]
pub(crate) const fn journald_available() -> bool {
    cfg!(all(target_os = "linux", feature = "journald"))
}

/// How a stage binary wants its logs.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `info` or `fuzzdup_core=debug,info`.
    pub filter: String,
    /// Let a `RUST_LOG` value replace `filter`.
    pub env_override: bool,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn without_env_override(mut self) -> Self {
        self.env_override = false;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "info".to_string(),
            env_override: true,
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_is_lenient_about_case_and_space() {
        assert_eq!(" TEXT ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("plain".parse::<LogFormat>().unwrap(), LogFormat::Text);
    }

    #[test]
    fn unknown_format_keeps_the_input() {
        let err = "yaml".parse::<LogFormat>().unwrap_err();
        assert!(matches!(err, LoggerError::UnknownFormat(ref s) if s == "yaml"));
    }

    #[test]
    fn journald_depends_on_platform_and_feature() {
        let parsed = "journald".parse::<LogFormat>();
        if journald_available() {
            assert_eq!(parsed.unwrap(), LogFormat::Journald);
        } else {
            assert!(matches!(parsed, Err(LoggerError::JournaldUnavailable)));
        }
    }

    #[test]
    fn display_matches_parse() {
        for format in [LogFormat::Text, LogFormat::Json] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }

    #[test]
    fn builder_overrides_defaults() {
        let cfg = LoggerConfig::default()
            .with_format(LogFormat::Json)
            .with_filter("debug")
            .without_env_override();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.filter, "debug");
        assert!(!cfg.env_override);
    }
}

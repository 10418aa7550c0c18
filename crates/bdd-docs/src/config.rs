//! Run configuration parsed from environment variables.
//!
//! Every setting can be supplied through a `BDD_DOCS_` environment variable
//! and overridden afterwards, typically by command-line flags.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Log level enumeration matching tracing crate levels.
///
/// Defaults to `Info` when not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Most verbose logging.
    Trace,
    /// Per-file indexing detail.
    Debug,
    /// Run summaries.
    #[default]
    Info,
    /// Downgraded feature files and skipped step patterns.
    Warn,
    /// Fatal errors only.
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Configuration for a documentation run.
///
/// # Environment Variables
///
/// - `BDD_DOCS_LOG_LEVEL`: trace, debug, info, warn or error
/// - `BDD_DOCS_ADD_IMPLEMENTED_TAGS`: true/false, 1/0 or yes/no
/// - `BDD_DOCS_STEPS`: step-definition sources as a platform path list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsConfig {
    /// Rust files or directories holding step definitions.
    pub steps: Vec<PathBuf>,
    /// Append `Implemented` / `Not Implemented` tags to steps and scenarios.
    pub add_implemented_tags: bool,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: LogLevel,
}

impl DocsConfig {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an environment variable contains an invalid
    /// value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_level = match env::var("BDD_DOCS_LOG_LEVEL") {
            Ok(val) => val.parse()?,
            Err(_) => LogLevel::default(),
        };

        let add_implemented_tags = match env::var("BDD_DOCS_ADD_IMPLEMENTED_TAGS") {
            Ok(val) => parse_flag(&val)?,
            Err(_) => false,
        };

        let steps = env::var_os("BDD_DOCS_STEPS")
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();

        Ok(Self {
            steps,
            add_implemented_tags,
            log_level,
        })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// Step sources given here are appended to those already configured.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        log_level: Option<LogLevel>,
        add_implemented_tags: Option<bool>,
        steps: Vec<PathBuf>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }

        if let Some(flag) = add_implemented_tags {
            self.add_implemented_tags = flag;
        }

        self.steps.extend(steps);
        self
    }

    /// Create a new configuration with the given step-definition sources.
    #[must_use]
    pub fn with_steps<I, P>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }

    /// Create a new configuration with implementation tags toggled.
    #[must_use]
    pub fn with_implemented_tags(mut self, enabled: bool) -> Self {
        self.add_implemented_tags = enabled;
        self
    }

    /// Create a new configuration with the specified log level.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError(format!(
            "invalid boolean '{other}' for BDD_DOCS_ADD_IMPLEMENTED_TAGS"
        ))),
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("trace", LogLevel::Trace)]
    #[case("DEBUG", LogLevel::Debug)]
    #[case("Info", LogLevel::Info)]
    #[case("warning", LogLevel::Warn)]
    #[case("error", LogLevel::Error)]
    fn log_level_parses_valid_values(#[case] raw: &str, #[case] expected: LogLevel) {
        assert_eq!(raw.parse::<LogLevel>().ok(), Some(expected));
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let result = "loud".parse::<LogLevel>();
        assert!(result.unwrap_err().to_string().contains("unknown log level"));
    }

    #[rstest]
    #[case("true", true)]
    #[case("1", true)]
    #[case("YES", true)]
    #[case("false", false)]
    #[case("0", false)]
    #[case("", false)]
    fn flags_parse_common_spellings(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(parse_flag(raw).unwrap(), expected);
    }

    #[test]
    fn flags_reject_other_values() {
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn default_config_has_no_steps_and_no_tags() {
        let config = DocsConfig::default();
        assert!(config.steps.is_empty());
        assert!(!config.add_implemented_tags);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn apply_overrides_updates_selected_fields() {
        let config = DocsConfig::default()
            .with_steps(["tests/steps"])
            .apply_overrides(Some(LogLevel::Error), Some(true), vec![PathBuf::from("more.rs")]);
        assert_eq!(config.log_level, LogLevel::Error);
        assert!(config.add_implemented_tags);
        assert_eq!(
            config.steps,
            vec![PathBuf::from("tests/steps"), PathBuf::from("more.rs")]
        );

        let config = DocsConfig::default().apply_overrides(None, None, Vec::new());
        assert_eq!(config, DocsConfig::default());
    }
}

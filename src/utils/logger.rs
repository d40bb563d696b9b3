use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Filter directive, e.g. `info` or `oneof=trace,info`.
    pub level: String,
    pub file_dir: Option<String>,
    pub file_prefix: Option<String>,
    /// `minutely`, `hourly` or `daily` (default).
    pub rolling: Option<String>,
    pub max_files: usize,
}

impl LoggerConfig {
    /// Loads logging configuration from environment variables.
    /// If a variable is not set, it will use a default value.
    /// Filled in variables are: LOG_LEVEL, LOG_FILE_DIR, LOG_FILE_PREFIX, LOG_ROLLING
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or(defaults.level),
            file_dir: std::env::var("LOG_FILE_DIR").ok(),
            file_prefix: std::env::var("LOG_FILE_PREFIX").ok(),
            rolling: std::env::var("LOG_ROLLING").ok().or(defaults.rolling),
            max_files: defaults.max_files,
        }
    }

    fn rotation(&self) -> Rotation {
        match self.rolling.as_deref() {
            Some("minutely") => Rotation::MINUTELY,
            Some("hourly") => Rotation::HOURLY,
            _ => Rotation::DAILY,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Install the global subscriber. Keep the returned guard alive for as long as
    /// file output should be flushed. Installing twice is not an error; the first
    /// subscriber stays.
    pub fn init(&self) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
        let Some(dir) = self.file_dir.as_deref() else {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(self.filter())
                .try_init();
            tracing::debug!("logging to stdout (no file_dir)");
            return Ok(None);
        };

        let prefix = self.file_prefix.as_deref().unwrap_or("oneof");
        let appender = RollingFileAppender::builder()
            .rotation(self.rotation())
            .max_log_files(self.max_files.max(1))
            .filename_prefix(prefix)
            .build(dir)
            .with_context(|| format!("failed to create rolling appender in {dir}"))?;

        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_ansi(false)
            .with_writer(writer)
            .try_init();

        tracing::info!(dir, prefix, rolling = ?self.rolling, "logging to file");
        Ok(Some(guard))
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_dir: None,
            file_prefix: None,
            rolling: Some("daily".to_string()),
            max_files: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let cfg: LoggerConfig = serde_json::from_str(r#"{ "level": "debug" }"#).unwrap();
        assert_eq!(cfg.level, "debug");
        assert_eq!(cfg.max_files, 2);
        assert_eq!(cfg.rotation(), Rotation::DAILY);
    }

    #[test]
    fn bad_filter_falls_back_to_info() {
        let cfg = LoggerConfig {
            level: "oneof=loud".into(),
            ..LoggerConfig::default()
        };
        assert_eq!(cfg.filter().to_string(), "info");
    }

    #[test]
    fn stdout_init_is_repeatable() {
        let cfg = LoggerConfig::default();
        assert!(cfg.init().unwrap().is_none());
        assert!(cfg.init().unwrap().is_none());
    }
}

use alarm_stop_core::identifier::{IdentifierExtractor, InstanceId};
use thiserror::Error;

pub const FALLBACK_INSTANCE_ID_ENV: &str = "INSTANCE_ID";
pub const REPORT_BATCH_ITEM_FAILURES_ENV: &str = "REPORT_BATCH_ITEM_FAILURES";
pub const LOG_LEVEL_ENV: &str = "ALARM_STOP_LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a boolean (true/false/1/0/yes/no), got '{value}'")]
    InvalidFlag { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Used only when the alarm itself does not name an instance.
    pub fallback_instance_id: Option<InstanceId>,
    /// Return per-item failures instead of failing the whole batch.
    pub report_batch_item_failures: bool,
    pub log_level: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            fallback_instance_id: None,
            report_batch_item_failures: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ReconcilerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let fallback_instance_id = lookup(FALLBACK_INSTANCE_ID_ENV)
            .as_deref()
            .and_then(InstanceId::parse);

        let report_batch_item_failures = match lookup(REPORT_BATCH_ITEM_FAILURES_ENV) {
            Some(value) => parse_flag(REPORT_BATCH_ITEM_FAILURES_ENV, &value)?,
            None => false,
        };

        let log_level = lookup(LOG_LEVEL_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            fallback_instance_id,
            report_batch_item_failures,
            log_level,
        })
    }

    pub fn extractor(&self) -> IdentifierExtractor {
        IdentifierExtractor::new(self.fallback_instance_id.clone())
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: raw.to_string(),
        }),
    }
}

use crate::error::{Result, SrsError};
use crate::fsrs::MemoryModel;
use crate::params::FsrsParams;
use crate::sanitize::validate_target_retention;
use crate::types::DEFAULT_TARGET_RETENTION;

pub const ENV_TARGET_RETENTION: &str = "FSRS_TARGET_RETENTION";
pub const ENV_PARAMS: &str = "FSRS_PARAMS";
pub const ENV_FILE_LOGS: &str = "ENABLE_FILE_LOGS";
pub const ENV_LOG_DIR: &str = "LOG_DIR";
pub const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub target_retention: f64,
    pub params: FsrsParams,
    pub log_level: String,
    /// Also write a daily-rolling log file under `log_dir`
    pub file_logs: bool,
    pub log_dir: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_retention: DEFAULT_TARGET_RETENTION,
            params: FsrsParams::DEFAULT,
            log_level: "info".to_string(),
            file_logs: false,
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Reads `FSRS_TARGET_RETENTION`, `FSRS_PARAMS`, `RUST_LOG`,
    /// `ENABLE_FILE_LOGS` and `LOG_DIR`.
    ///
    /// Unset variables fall back to the defaults; set but malformed ones are
    /// errors, since a bad weight table would be written into every card.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let target_retention = match non_empty(ENV_TARGET_RETENTION) {
            Some(raw) => {
                let value = raw.trim().parse::<f64>().map_err(|_| {
                    SrsError::Config(format!("{ENV_TARGET_RETENTION} is not a number: {raw}"))
                })?;
                validate_target_retention(value)?
            }
            None => DEFAULT_TARGET_RETENTION,
        };

        let params = match non_empty(ENV_PARAMS) {
            Some(raw) => FsrsParams::parse(&raw)?,
            None => FsrsParams::DEFAULT,
        };

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let file_logs = non_empty(ENV_FILE_LOGS)
            .map(|v| matches!(v.trim(), "true" | "1"))
            .unwrap_or(false);
        let log_dir = non_empty(ENV_LOG_DIR).unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());

        Ok(Self {
            target_retention,
            params,
            log_level,
            file_logs,
            log_dir,
        })
    }

    pub fn model(&self) -> Result<MemoryModel> {
        MemoryModel::new(self.params, self.target_retention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Grade;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = SchedulerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.target_retention, 0.9);
        assert_eq!(config.params, FsrsParams::DEFAULT);
        assert_eq!(config.log_level, "info");
        assert!(!config.file_logs);
        assert_eq!(config.log_dir, DEFAULT_LOG_DIR);
    }

    #[test]
    fn test_file_log_settings() {
        let config = SchedulerConfig::from_lookup(lookup(&[
            (ENV_FILE_LOGS, "1"),
            (ENV_LOG_DIR, "/var/log/woord"),
        ]))
        .unwrap();
        assert!(config.file_logs);
        assert_eq!(config.log_dir, "/var/log/woord");

        for off in ["false", "0", "yes", ""] {
            let config = SchedulerConfig::from_lookup(lookup(&[(ENV_FILE_LOGS, off)])).unwrap();
            assert!(!config.file_logs, "{off:?} must not enable file logs");
        }
    }

    #[test]
    fn test_overrides() {
        let mut weights = FsrsParams::DEFAULT.weights().to_vec();
        weights[0] = 0.3;
        let raw = serde_json::to_string(&weights).unwrap();
        let config = SchedulerConfig::from_lookup(lookup(&[
            (ENV_TARGET_RETENTION, "0.85"),
            (ENV_PARAMS, raw.as_str()),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.target_retention, 0.85);
        assert_eq!(config.params.initial_stability(Grade::Again), 0.3);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.model().unwrap().target_retention(), 0.85);
    }

    #[test]
    fn test_malformed_values_rejected() {
        assert!(matches!(
            SchedulerConfig::from_lookup(lookup(&[(ENV_TARGET_RETENTION, "high")])),
            Err(SrsError::Config(_))
        ));
        assert!(matches!(
            SchedulerConfig::from_lookup(lookup(&[(ENV_TARGET_RETENTION, "1.2")])),
            Err(SrsError::InvalidTargetRetention(_))
        ));
        assert!(matches!(
            SchedulerConfig::from_lookup(lookup(&[(ENV_PARAMS, "0.1, 0.2, 0.3")])),
            Err(SrsError::InvalidParamCount { actual: 3, .. })
        ));
    }
}

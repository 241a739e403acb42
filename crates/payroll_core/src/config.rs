//! Runtime configuration for the raise pipeline.
//!
//! # Responsibility
//! - Provide defaults for output path, worker count and completion timeout.
//! - Read overrides from `PAYROLL_*` environment variables.
//!
//! # Invariants
//! - `workers` and `timeout` are always non-zero.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_OUTPUT_PATH: &str = "PAYROLL_OUTPUT_PATH";
pub const ENV_WORKERS: &str = "PAYROLL_WORKERS";
pub const ENV_TIMEOUT_SECS: &str = "PAYROLL_TIMEOUT_SECS";

pub const DEFAULT_OUTPUT_PATH: &str = "data/employees.csv";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const FALLBACK_WORKERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollConfig {
    /// Persisted output file, overwritten on every run.
    pub output_path: PathBuf,
    /// Upper bound on raise worker threads.
    pub workers: NonZeroUsize,
    /// Bound on waiting for all workers to finish.
    pub timeout: Duration,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            workers: default_workers(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PayrollConfig {
    /// Builds a config from defaults plus `PAYROLL_*` environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = non_blank(lookup(ENV_OUTPUT_PATH)) {
            config.output_path = PathBuf::from(raw);
        }
        if let Some(raw) = non_blank(lookup(ENV_WORKERS)) {
            config.workers = raw
                .parse::<NonZeroUsize>()
                .map_err(|_| invalid(ENV_WORKERS, &raw, "expected a positive integer"))?;
        }
        if let Some(raw) = non_blank(lookup(ENV_TIMEOUT_SECS)) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid(ENV_TIMEOUT_SECS, &raw, "expected a positive integer"))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Available parallelism, falling back to a small fixed pool.
pub fn default_workers() -> NonZeroUsize {
    std::thread::available_parallelism()
        .unwrap_or(NonZeroUsize::new(FALLBACK_WORKERS).unwrap_or(NonZeroUsize::MIN))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn invalid(key: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason,
    }
}

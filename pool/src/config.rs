//! Pool configuration.

use rowpool_mutation::{JsonSerializer, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{PoolError, PoolResult};

/// Workers per pool unless configured otherwise.
pub const DEFAULT_SIZE: usize = 24;

/// Environment variable read by [`PoolConfig::from_env`] for the worker count.
pub const SIZE_ENV: &str = "ROWPOOL_SIZE";

/// Environment variable read by [`PoolConfig::from_env`] for the failure policy.
pub const FAILURE_POLICY_ENV: &str = "ROWPOOL_FAILURE_POLICY";

/// What a worker does after one of its items fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop this worker's loop; siblings keep draining.
    #[default]
    StopWorker,
    /// Record the failure and take the next item.
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stop" | "stop_worker" => Ok(FailurePolicy::StopWorker),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(PoolError::invalid_config(
                FAILURE_POLICY_ENV,
                format!("expected `stop` or `continue`, got `{}`", other),
            )),
        }
    }
}

/// Configuration for one pool run.
#[derive(Clone)]
pub struct PoolConfig {
    /// Number of concurrent workers.
    pub size: usize,
    /// Encoder for list and map column values.
    pub serializer: Arc<dyn Serializer>,
    /// Behaviour after a failed item.
    pub failure_policy: FailurePolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            serializer: Arc::new(JsonSerializer),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Reject a worker count of zero.
    pub fn validate(&self) -> PoolResult<()> {
        if self.size == 0 {
            return Err(PoolError::invalid_worker_count(0));
        }
        Ok(())
    }

    /// Defaults overridden by `ROWPOOL_SIZE` and `ROWPOOL_FAILURE_POLICY`.
    pub fn from_env() -> PoolResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the known keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PoolResult<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(SIZE_ENV) {
            config.size = parse_size(&raw)?;
        }
        if let Some(raw) = lookup(FAILURE_POLICY_ENV) {
            config.failure_policy = raw.parse()?;
        }
        Ok(config)
    }
}

fn parse_size(raw: &str) -> PoolResult<usize> {
    let size: i64 = raw
        .trim()
        .parse()
        .map_err(|_| PoolError::invalid_worker_count(raw.trim()))?;
    if size <= 0 {
        return Err(PoolError::invalid_worker_count(size));
    }
    usize::try_from(size).map_err(|_| PoolError::invalid_worker_count(size))
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("size", &self.size)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

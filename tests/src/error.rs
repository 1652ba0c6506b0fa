//! Scenario error types.

use rowpool::PoolError;
use rowpool_store::StoreError;
use thiserror::Error;

/// Errors raised while running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Fixture setup or a count query failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The pool run itself failed.
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    /// A count did not match.
    #[error("scenario '{scenario}': {message}")]
    Expectation { scenario: String, message: String },
}

impl ScenarioError {
    pub fn expectation(scenario: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Expectation {
            scenario: scenario.into(),
            message: message.into(),
        }
    }
}

/// Result type for scenarios.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

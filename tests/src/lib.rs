//! rowpool integration test fixtures.
//!
//! Provides:
//! - `ActivityFixture` - a seeded activities table behind a `TableModel`
//! - `Scenario` - before/after count expectations around one pool run
//!
//! # Example
//!
//! ```ignore
//! use rowpool_tests::prelude::*;
//!
//! let fixture = ActivityFixture::new();
//! Scenario::new("delete likes")
//!     .change(kind("like"), 75, 0)
//!     .run(&fixture, |model| model.pool(["id", "kind"]).run(delete_likes))
//!     .unwrap();
//! ```

mod error;
mod fixture;
mod scenario;

pub use error::{ScenarioError, ScenarioResult};
pub use fixture::{kind, ActivityFixture, ACTIVITY_COLUMNS, ACTIVITY_TABLE, DISLIKES, LIKES};
pub use scenario::{Change, Scenario};

/// Prelude for test files.
pub mod prelude {
    pub use crate::{
        kind, ActivityFixture, Change, Scenario, ScenarioError, ScenarioResult, ACTIVITY_TABLE,
        DISLIKES, LIKES,
    };
    pub use rowpool::prelude::*;
    pub use rowpool::{ExecutionCause, MutationExecutionError, PoolReport};
    pub use rowpool_store::{Model, Scope, SelectQuery, StoreError, TableModel};
}

//! Seeded activity tables.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rowpool::attrs;
use rowpool_store::{MemoryDatabase, Scope, TableModel, DEFAULT_POOL_SIZE};
use std::sync::Arc;

use crate::error::ScenarioResult;

pub const ACTIVITY_TABLE: &str = "activities";
pub const ACTIVITY_COLUMNS: [&str; 3] = ["kind", "category", "payload"];

/// Seeded `kind = "like"` rows.
pub const LIKES: usize = 75;
/// Seeded `kind = "dislike"` rows.
pub const DISLIKES: usize = 25;

/// Rows whose `kind` equals `value`.
pub fn kind(value: &str) -> Scope {
    Scope::all().where_eq("kind", value)
}

/// An activities table in a fresh in-memory database.
#[derive(Debug, Clone)]
pub struct ActivityFixture {
    model: TableModel,
}

impl ActivityFixture {
    /// 75 likes then 25 dislikes, with the default connection pool.
    pub fn new() -> ScenarioResult<Self> {
        Self::with_counts(LIKES, DISLIKES, DEFAULT_POOL_SIZE)
    }

    pub fn with_counts(likes: usize, dislikes: usize, connections: usize) -> ScenarioResult<Self> {
        let fixture = Self::empty(connections)?;
        let db = fixture.model.database();
        for _ in 0..likes {
            db.insert(ACTIVITY_TABLE, attrs! { "kind" => "like" })?;
        }
        for _ in 0..dislikes {
            db.insert(ACTIVITY_TABLE, attrs! { "kind" => "dislike" })?;
        }
        Ok(fixture)
    }

    /// `rows` activities with kinds and categories drawn from a seeded RNG.
    pub fn random(seed: u64, rows: usize) -> ScenarioResult<Self> {
        const KINDS: [&str; 3] = ["like", "dislike", "share"];
        const CATEGORIES: [&str; 3] = ["post", "comment", "photo"];

        let mut rng = StdRng::seed_from_u64(seed);
        let fixture = Self::empty(DEFAULT_POOL_SIZE)?;
        let db = fixture.model.database();
        for _ in 0..rows {
            let kind = KINDS[rng.gen_range(0..KINDS.len())];
            let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            db.insert(ACTIVITY_TABLE, attrs! { "kind" => kind, "category" => category })?;
        }
        Ok(fixture)
    }

    fn empty(connections: usize) -> ScenarioResult<Self> {
        let db = MemoryDatabase::new(connections)?;
        db.create_table(ACTIVITY_TABLE, ACTIVITY_COLUMNS)?;
        let model = TableModel::new(Arc::new(db), ACTIVITY_TABLE)?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &TableModel {
        &self.model
    }

    pub fn count(&self, scope: &Scope) -> ScenarioResult<usize> {
        Ok(self.model.count(scope)?)
    }

    /// Most connections ever leased at once.
    pub fn connection_high_water(&self) -> usize {
        self.model.database().pool().high_water()
    }

    pub fn connections_in_use(&self) -> usize {
        self.model.database().pool().in_use()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed() {
        let fixture = ActivityFixture::new().unwrap();
        assert_eq!(fixture.count(&kind("like")).unwrap(), LIKES);
        assert_eq!(fixture.count(&kind("dislike")).unwrap(), DISLIKES);
        assert_eq!(fixture.count(&Scope::all()).unwrap(), LIKES + DISLIKES);
    }

    #[test]
    fn test_random_is_reproducible() {
        let a = ActivityFixture::random(7, 40).unwrap();
        let b = ActivityFixture::random(7, 40).unwrap();
        for value in ["like", "dislike", "share"] {
            assert_eq!(
                a.count(&kind(value)).unwrap(),
                b.count(&kind(value)).unwrap()
            );
        }
        assert_eq!(a.count(&Scope::all()).unwrap(), 40);
    }
}

//! Before/after count expectations around one pool run.

use rowpool::{PoolError, PoolReport, PoolResult};
use rowpool_store::{Scope, TableModel};

use crate::error::{ScenarioError, ScenarioResult};
use crate::fixture::ActivityFixture;

/// Expect the row count in `scope` to move from `from` to `to`.
#[derive(Debug, Clone)]
pub struct Change {
    pub scope: Scope,
    pub from: usize,
    pub to: usize,
}

/// A named pool run with count expectations.
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    changes: Vec<Change>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            changes: Vec::new(),
        }
    }

    pub fn change(mut self, scope: Scope, from: usize, to: usize) -> Self {
        self.changes.push(Change { scope, from, to });
        self
    }

    /// Expect the count in `scope` to stay at `count`.
    pub fn unchanged(self, scope: Scope, count: usize) -> Self {
        self.change(scope, count, count)
    }

    /// Run `body`, which must succeed, checking counts before and after.
    pub fn run<F>(&self, fixture: &ActivityFixture, body: F) -> ScenarioResult<PoolReport>
    where
        F: FnOnce(&TableModel) -> PoolResult<PoolReport>,
    {
        self.check(fixture, |c| c.from, "before")?;
        let report = body(fixture.model())?;
        self.check(fixture, |c| c.to, "after")?;
        Ok(report)
    }

    /// Run `body`, which must fail, checking counts before and after.
    pub fn run_failing<F>(&self, fixture: &ActivityFixture, body: F) -> ScenarioResult<PoolError>
    where
        F: FnOnce(&TableModel) -> PoolResult<PoolReport>,
    {
        self.check(fixture, |c| c.from, "before")?;
        let err = match body(fixture.model()) {
            Ok(report) => {
                return Err(ScenarioError::expectation(
                    &self.name,
                    format!("expected the run to fail, got {:?}", report),
                ))
            }
            Err(err) => err,
        };
        self.check(fixture, |c| c.to, "after")?;
        Ok(err)
    }

    fn check(
        &self,
        fixture: &ActivityFixture,
        expected: impl Fn(&Change) -> usize,
        when: &str,
    ) -> ScenarioResult<()> {
        for change in &self.changes {
            let actual = fixture.count(&change.scope)?;
            if actual != expected(change) {
                return Err(ScenarioError::expectation(
                    &self.name,
                    format!(
                        "{} the run, {} rows matched {}, expected {}",
                        when,
                        actual,
                        describe(&change.scope),
                        expected(change)
                    ),
                ));
            }
        }
        if fixture.connections_in_use() != 0 {
            return Err(ScenarioError::expectation(
                &self.name,
                format!("{} connection(s) still leased {} the run", fixture.connections_in_use(), when),
            ));
        }
        Ok(())
    }
}

fn describe(scope: &Scope) -> String {
    if scope.filters().is_empty() {
        return "all rows".to_string();
    }
    scope
        .filters()
        .iter()
        .map(|f| format!("{} = {}", f.column, f.value))
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::kind;

    #[test]
    fn test_mismatch_names_the_scope() {
        // GIVEN
        let fixture = ActivityFixture::with_counts(2, 0, 1).unwrap();
        let scenario = Scenario::new("wrong count").change(kind("like"), 3, 0);

        // WHEN
        let err = scenario
            .run(&fixture, |_| Ok(PoolReport::default()))
            .unwrap_err();

        // THEN
        assert_eq!(
            err.to_string(),
            "scenario 'wrong count': before the run, 2 rows matched kind = \"like\", expected 3"
        );
    }

    #[test]
    fn test_run_failing_rejects_success() {
        let fixture = ActivityFixture::with_counts(1, 0, 1).unwrap();
        let err = Scenario::new("should fail")
            .run_failing(&fixture, |_| Ok(PoolReport::default()))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Expectation { .. }));
    }
}

//! Failure isolation, atomicity and error reporting.

use pretty_assertions::assert_eq;
use rowpool_tests::prelude::*;
use std::sync::Barrier;
use std::time::Duration;

fn like_id(fixture: &ActivityFixture) -> i64 {
    fixture
        .model()
        .pluck(&kind("like"), &["id".to_string()])
        .unwrap()
        .first()
        .and_then(|row| row[0].as_int())
        .unwrap()
}

#[test]
fn test_failing_instruction_rolls_back_its_item() -> ScenarioResult<()> {
    // GIVEN - each item updates its row, then writes to a column that does not exist
    let fixture = ActivityFixture::with_counts(4, 0, 2)?;

    // WHEN
    let err = Scenario::new("atomic item")
        .unchanged(kind("like"), 4)
        .unchanged(kind("dislike"), 0)
        .run_failing(&fixture, |model| {
            model
                .pool(["id"])
                .size(2)
                .failure_policy(FailurePolicy::Continue)
                .run(|b, row| {
                    vec![
                        b.update(row[0].clone(), attrs! { "kind" => "dislike" }),
                        b.update(row[0].clone(), attrs! { "missing" => 1i64 }),
                    ]
                })
        })?;

    // THEN
    assert_eq!(err.failures().len(), 4);
    for failure in err.failures() {
        assert!(matches!(
            failure.cause,
            ExecutionCause::Store(StoreError::UnknownColumn { .. })
        ));
    }
    Ok(())
}

#[test]
fn test_rolled_back_item_keeps_a_concurrent_commit() -> ScenarioResult<()> {
    // GIVEN - two items write the same row; the first fails after a long run of updates
    let fixture = ActivityFixture::with_counts(1, 0, 2)?;
    let both_started = Barrier::new(2);
    let items = Source::Tuples(vec![
        vec![Value::Int(1), Value::from("a")],
        vec![Value::Int(1), Value::from("b")],
    ]);

    // WHEN
    let err = Scenario::new("concurrent writers")
        .change(kind("like"), 1, 0)
        .change(kind("b"), 0, 1)
        .unchanged(kind("a"), 0)
        .run_failing(&fixture, |model| {
            model
                .pool(["id", "kind"])
                .size(2)
                .source(items)
                .run(|b, row| {
                    both_started.wait();
                    let id = row[0].clone();
                    let mut instructions = vec![b.update(id.clone(), attrs! { "kind" => row[1].clone() })];
                    if row[1] == Value::from("a") {
                        instructions.extend(
                            (0..2_000i64).map(|i| b.update(id.clone(), attrs! { "category" => i })),
                        );
                        instructions.push(b.update(id.clone(), attrs! { "missing" => 1i64 }));
                    } else {
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    instructions
                })
        })?;

    // THEN - only the failing item is reported, and the committed "b" survives its rollback
    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].item[1], Value::from("a"));
    Ok(())
}

#[test]
fn test_one_failing_item_does_not_block_the_rest() -> ScenarioResult<()> {
    // GIVEN
    let fixture = ActivityFixture::new()?;
    let poisoned = like_id(&fixture);

    // WHEN - four workers; one item fails and its worker stops
    let err = Scenario::new("independent items")
        .change(kind("like"), LIKES, 1)
        .run_failing(&fixture, |model| {
            model.pool(["id", "kind"]).size(4).run(|b, row| {
                if row[0] == Value::Int(poisoned) {
                    return Err(MutationError::transform("poisoned row"));
                }
                Ok((row[1] == Value::from("like")).then(|| b.delete(row[0].clone())))
            })
        })?;

    // THEN
    match err {
        PoolError::MutationExecution {
            failures,
            unprocessed,
        } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].item[0], Value::Int(poisoned));
            assert_eq!(unprocessed, 0);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[test]
fn test_sole_worker_stops_on_first_failure() -> ScenarioResult<()> {
    // GIVEN - ids 1..=75 are likes; the first item fails
    let fixture = ActivityFixture::new()?;

    // WHEN
    let err = Scenario::new("single worker stops")
        .unchanged(Scope::all(), LIKES + DISLIKES)
        .run_failing(&fixture, |model| {
            model
                .pool(["id"])
                .size(1)
                .run(|_, _| -> MutationResult<()> { Err(MutationError::transform("no")) })
        })?;

    // THEN
    assert!(matches!(
        err,
        PoolError::MutationExecution { ref failures, unprocessed } if failures.len() == 1 && unprocessed == LIKES + DISLIKES - 1
    ));
    Ok(())
}

#[test]
fn test_panicking_transform_is_reported() -> ScenarioResult<()> {
    let fixture = ActivityFixture::with_counts(3, 0, 1)?;

    let err = Scenario::new("panic")
        .unchanged(kind("like"), 3)
        .run_failing(&fixture, |model| {
            model
                .pool(["id"])
                .failure_policy(FailurePolicy::Continue)
                .run(|b, row| {
                    let _ = b.update(row[0].clone(), attrs! { "kind" => "dislike" });
                    if row[0] == Value::Int(2) {
                        panic!("row two");
                    }
                })
        })?;

    let failures = err.failures();
    assert_eq!(failures.len(), 1);
    match &failures[0].cause {
        ExecutionCause::Panicked { message } => assert_eq!(message, "row two"),
        other => panic!("unexpected cause: {:?}", other),
    }
    Ok(())
}

#[test]
fn test_zero_workers_rejected_before_reading_rows() -> ScenarioResult<()> {
    let fixture = ActivityFixture::new()?;

    let err = Scenario::new("zero workers")
        .unchanged(Scope::all(), LIKES + DISLIKES)
        .run_failing(&fixture, |model| {
            model
                .pool(["id"])
                .size(0)
                .run(|b, row| b.delete(row[0].clone()))
        })?;

    assert!(matches!(err, PoolError::InvalidWorkerCount { ref size } if size == "0"));
    Ok(())
}

#[test]
fn test_negative_size_from_config_rejected() {
    let err = PoolConfig::from_lookup(|key| (key == rowpool::SIZE_ENV).then(|| "-3".to_string()))
        .unwrap_err();
    assert!(matches!(err, PoolError::InvalidWorkerCount { ref size } if size == "-3"));
}

#[test]
fn test_query_on_unknown_table_is_a_store_error() -> ScenarioResult<()> {
    let fixture = ActivityFixture::new()?;

    let err = Scenario::new("bad query")
        .unchanged(Scope::all(), LIKES + DISLIKES)
        .run_failing(&fixture, |model| {
            model
                .pool(["id"])
                .source(Source::Query(SelectQuery::from("missing").project(["id"])))
                .run(|b, row| b.delete(row[0].clone()))
        })?;

    assert!(matches!(
        err,
        PoolError::Store(StoreError::UnknownTable { .. })
    ));
    Ok(())
}

//! End-to-end runs over 75 likes and 25 dislikes.

use rowpool_tests::prelude::*;

fn delete_likes(b: &MutationBuilder, row: &WorkItem) -> Option<MutationInstruction> {
    (row[1] == Value::from("like")).then(|| b.delete(row[0].clone()))
}

#[test]
fn test_delete_likes() -> ScenarioResult<()> {
    let fixture = ActivityFixture::new()?;

    let report = Scenario::new("delete likes")
        .change(kind("like"), LIKES, 0)
        .unchanged(kind("dislike"), DISLIKES)
        .run(&fixture, |model| model.pool(["id", "kind"]).run(delete_likes))?;

    assert_eq!(report.processed, LIKES + DISLIKES);
    assert_eq!(report.affected, LIKES);
    Ok(())
}

#[test]
fn test_insert_response_per_like() -> ScenarioResult<()> {
    let fixture = ActivityFixture::new()?;
    let responses = Scope::all()
        .where_eq("kind", "response")
        .where_eq("category", "like");

    Scenario::new("insert responses")
        .change(responses, 0, LIKES)
        .unchanged(kind("like"), LIKES)
        .run(&fixture, |model| {
            model.pool(["id", "kind"]).run(|b, row| {
                if row[1] == Value::from("like") {
                    Some(b.insert(attrs! { "kind" => "response", "category" => "like" }))
                } else {
                    None
                }
            })
        })?;
    Ok(())
}

#[test]
fn test_update_likes_to_dislikes() -> ScenarioResult<()> {
    let fixture = ActivityFixture::new()?;

    Scenario::new("update likes")
        .change(kind("dislike"), DISLIKES, LIKES + DISLIKES)
        .change(kind("like"), LIKES, 0)
        .run(&fixture, |model| {
            model.pool(["id", "kind"]).run(|b, row| {
                (row[1] == Value::from("like"))
                    .then(|| b.update(row[0].clone(), attrs! { "kind" => "dislike" }))
            })
        })?;
    Ok(())
}

#[test]
fn test_scalar_source_is_rejected() -> ScenarioResult<()> {
    let fixture = ActivityFixture::new()?;

    let err = Scenario::new("unsupported source")
        .unchanged(Scope::all(), LIKES + DISLIKES)
        .run_failing(&fixture, |model| {
            model
                .pool(["id", "kind"])
                .source_value(Value::from("not a source"))
                .run(delete_likes)
        })?;

    match err {
        PoolError::UnrecognizedSourceKind { found, accepted } => {
            assert_eq!(found, "String");
            assert!(accepted.contains("list of tuples"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[test]
fn test_worker_count_does_not_change_the_outcome() -> ScenarioResult<()> {
    let mut finals = Vec::new();
    for size in [1, 50] {
        let fixture = ActivityFixture::new()?;
        Scenario::new(format!("size {}", size))
            .change(kind("like"), LIKES, 0)
            .run(&fixture, |model| {
                model.pool(["id", "kind"]).size(size).run(delete_likes)
            })?;
        finals.push((
            fixture.count(&kind("like"))?,
            fixture.count(&kind("dislike"))?,
        ));
    }

    assert_eq!(finals[0], finals[1]);
    assert_eq!(finals[0], (0, DISLIKES));
    Ok(())
}

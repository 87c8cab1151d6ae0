//! Single-flight and stale-response handling

mod common;

use common::{ids, MockScheduler};
use intelliplan::core::error::{EngineError, Operation};
use intelliplan::core::service::AppliedDescriptions;
use intelliplan::core::Session;
use std::sync::Arc;

async fn ready_session() -> (Arc<MockScheduler>, Session<MockScheduler>) {
    let mock = Arc::new(MockScheduler::new(&[1, 2, 3]).rule(
        "No classes before 1 PM",
        &[2, 3],
        AppliedDescriptions::Missing,
    ));
    let session = Session::new(Arc::clone(&mock));
    session.toggle_course("CS101");
    session.generate().await.unwrap();
    (mock, session)
}

/// Yield until `session` has an operation in flight
async fn wait_in_flight(session: &Session<MockScheduler>) {
    while session.state().in_flight().is_none() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_second_operation_is_busy_while_first_runs() {
    let (mock, session) = ready_session().await;
    let gate = mock.gate();
    let other = session.clone();

    let (applied, rejected) = tokio::join!(session.apply_constraint("No classes before 1 PM"), async {
        wait_in_flight(&other).await;
        let generate = other.generate().await;
        let remove = other.remove_constraint(0).await;
        let apply = other.apply_constraint("Morning only").await;
        gate.notify_one();
        (generate, remove, apply)
    });

    assert_eq!(applied.unwrap().remaining, 2);
    assert_eq!(
        rejected.0.unwrap_err(),
        EngineError::Busy(Operation::ApplyConstraint)
    );
    // Nothing applied yet, so removal fails validation before the flight check
    assert!(matches!(rejected.1, Err(EngineError::Validation(_))));
    assert_eq!(
        rejected.2.unwrap_err(),
        EngineError::Busy(Operation::ApplyConstraint)
    );
    assert_eq!(mock.filter_calls(), vec!["No classes before 1 PM"]);
    assert_eq!(mock.generate_calls(), 1);
}

#[tokio::test]
async fn test_clear_all_supersedes_pending_apply() {
    let (mock, session) = ready_session().await;
    let gate = mock.gate();
    let other = session.clone();

    let (applied, cleared) = tokio::join!(session.apply_constraint("No classes before 1 PM"), async {
        wait_in_flight(&other).await;
        let cleared = other.clear_all();
        gate.notify_one();
        cleared
    });

    assert_eq!(applied.unwrap_err(), EngineError::Superseded);
    assert!(cleared.is_ok());

    let state = session.state();
    assert!(state.chain().is_empty());
    assert!(state.displayed().same_as(state.baseline().unwrap()));
    assert_eq!(ids(state.displayed()), vec![1, 2, 3]);
    assert_eq!(state.in_flight(), None);
}

#[tokio::test]
async fn test_replay_holds_flight_until_cleared() {
    let (mock, session) = ready_session().await;
    session.apply_constraint("No classes before 1 PM").await.unwrap();
    session.apply_constraint("Morning only").await.unwrap();
    mock.reset_calls();
    let gate = mock.gate();
    let other = session.clone();

    let (removed, (second_remove, apply, cleared)) =
        tokio::join!(session.remove_constraint(0), async {
            wait_in_flight(&other).await;
            let second_remove = other.remove_constraint(1).await;
            let apply = other.apply_constraint("Avoid consecutive classes").await;
            let cleared = other.clear_all();
            gate.notify_one();
            (second_remove, apply, cleared)
        });

    assert_eq!(
        second_remove.unwrap_err(),
        EngineError::Busy(Operation::RemoveConstraint)
    );
    assert_eq!(
        apply.unwrap_err(),
        EngineError::Busy(Operation::RemoveConstraint)
    );
    assert!(cleared.is_ok());
    assert_eq!(removed.unwrap_err(), EngineError::Superseded);
    assert_eq!(mock.filter_calls(), vec!["Morning only"]);

    let state = session.state();
    assert!(state.chain().is_empty());
    assert!(state.displayed().same_as(state.baseline().unwrap()));
    assert_eq!(ids(state.displayed()), vec![1, 2, 3]);
    assert_eq!(state.in_flight(), None);
}

#[tokio::test]
async fn test_clear_all_rejected_during_generation() {
    let (mock, session) = ready_session().await;
    mock.set_timetables(&[7]);
    let gate = mock.gate();
    let other = session.clone();

    let (generated, cleared) = tokio::join!(session.generate(), async {
        wait_in_flight(&other).await;
        let cleared = other.clear_all();
        gate.notify_one();
        cleared
    });

    assert_eq!(cleared.unwrap_err(), EngineError::Busy(Operation::Generate));
    assert_eq!(generated.unwrap().timetables, 1);
    assert_eq!(ids(session.state().displayed()), vec![7]);
}

#[tokio::test]
async fn test_edits_and_cursor_allowed_during_generation() {
    let (mock, session) = ready_session().await;
    mock.set_timetables(&[4, 5]);
    let gate = mock.gate();
    let other = session.clone();

    let (generated, position) = tokio::join!(session.generate(), async {
        wait_in_flight(&other).await;
        other.toggle_course("MA201");
        let position = other.next();
        gate.notify_one();
        position
    });

    assert_eq!(position, Some(1));
    assert!(generated.is_ok());
    let state = session.state();
    assert!(state.selection().is_selected("MA201"));
    assert_eq!(state.cursor().index(), Some(0));
    assert_eq!(ids(state.displayed()), vec![4, 5]);
}

#[tokio::test]
async fn test_failed_operation_releases_flight() {
    let (mock, session) = ready_session().await;
    mock.fail_filter(
        "No classes before 1 PM",
        intelliplan::core::error::ServiceError::new("boom"),
    );

    let err = session
        .apply_constraint("No classes before 1 PM")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Error applying constraint");
    assert_eq!(session.state().in_flight(), None);

    // A fresh operation can start immediately
    assert!(session.apply_constraint("Morning only").await.is_ok());
}

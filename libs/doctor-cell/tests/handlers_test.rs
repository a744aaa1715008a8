mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Path, Query, State};
use axum::Json;

use doctor_cell::handlers::*;
use doctor_cell::models::PublishScheduleRequest;
use doctor_cell::router::DoctorCellState;
use shared_models::error::AppError;

use common::{date, services, time};

async fn create_state() -> Arc<DoctorCellState> {
    let (doctors, schedules) = services().await;
    Arc::new(DoctorCellState {
        doctors,
        schedules: Arc::new(schedules),
    })
}

#[tokio::test]
async fn test_publish_then_read_schedule() {
    let state = create_state().await;

    let request = PublishScheduleRequest {
        date: date("2024-01-10"),
        slots: vec![time("09:30"), time("09:00")],
    };
    let Json(published) = publish_schedule(
        State(state.clone()),
        Path("D1".to_string()),
        Json(request),
    )
    .await
    .expect("Publishing should succeed");
    assert_eq!(published["success"], true);

    let Json(schedule) = get_doctor_schedule(
        State(state),
        Path("D1".to_string()),
        Query(ScheduleQuery { date: date("2024-01-10") }),
    )
    .await
    .expect("Schedule lookup should succeed");

    assert_eq!(schedule["total_slots"], 2);
    assert_eq!(schedule["open_slots"][0], "09:00:00");
}

#[tokio::test]
async fn test_misaligned_publication_is_validation_error() {
    let state = create_state().await;

    let request = PublishScheduleRequest {
        date: date("2024-01-10"),
        slots: vec![time("09:10")],
    };
    let result = publish_schedule(State(state), Path("D1".to_string()), Json(request)).await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_unknown_doctor_maps_to_not_found() {
    let state = create_state().await;

    let result = get_doctor(State(state), Path("D404".to_string())).await;
    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn test_list_doctors_includes_total() {
    let state = create_state().await;

    let Json(body) = list_doctors(State(state)).await.expect("Listing should succeed");
    assert_eq!(body["total"], 1);
    assert_eq!(body["doctors"][0]["id"], "D1");
}

#[test]
fn test_storage_faults_map_to_retryable_unavailable() {
    use doctor_cell::models::DoctorError;
    use shared_database::DatabaseError;

    let faults = [
        DatabaseError::Io("disk full".to_string()),
        DatabaseError::Serialization("bad snapshot".to_string()),
        DatabaseError::Timeout {
            table: "doctors".to_string(),
            timeout_ms: 50,
        },
    ];
    for fault in faults {
        let err: AppError = DoctorError::Database(fault).into();
        assert_matches!(err, AppError::Unavailable { ref code, .. } if code == "storage_unavailable");
    }

    let err: AppError = DoctorError::Database(DatabaseError::VersionConflict {
        table: "doctor_schedules".to_string(),
        key: "D1|2024-01-10".to_string(),
        expected: 1,
        found: 2,
    })
    .into();
    assert_matches!(err, AppError::Unavailable { ref code, .. } if code == "concurrent_modification");
}

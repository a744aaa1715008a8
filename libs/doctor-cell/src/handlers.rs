use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::DatabaseError;
use shared_models::error::AppError;

use crate::models::{DoctorError, PublishScheduleRequest};
use crate::router::DoctorCellState;
use crate::services::DoctorDirectory;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: NaiveDate,
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(id) => AppError::NotFound(format!("Doctor not found: {}", id)),
            DoctorError::InvalidTimeSlot(msg) => AppError::ValidationError(msg),
            DoctorError::ValidationError(msg) => AppError::BadRequest(msg),
            DoctorError::Database(db) => storage_error(db),
        }
    }
}

/// Same codes the appointment routes use for storage faults.
fn storage_error(db: DatabaseError) -> AppError {
    let message = db.to_string();
    match db {
        DatabaseError::NotFound { .. } => AppError::NotFound(message),
        DatabaseError::DuplicateKey { .. } => AppError::conflict("duplicate_id", message),
        DatabaseError::VersionConflict { .. } => AppError::Unavailable {
            code: "concurrent_modification".to_string(),
            message,
        },
        DatabaseError::Timeout { .. } | DatabaseError::Io(_) | DatabaseError::Serialization(_) => {
            AppError::Unavailable {
                code: "storage_unavailable".to_string(),
                message,
            }
        }
    }
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<DoctorCellState>>,
) -> Result<Json<Value>, AppError> {
    let doctors = state.doctors.list_doctors().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor = state.doctors.require_doctor(&doctor_id).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_doctor_schedule(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Value>, AppError> {
    let schedule = state.schedules.get_doctor_schedule(&doctor_id, query.date).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": schedule.date,
        "slot_minutes": schedule.slot_minutes,
        "open_slots": schedule.open_slots,
        "total_slots": schedule.open_slots.len()
    })))
}

#[axum::debug_handler]
pub async fn publish_schedule(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<PublishScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let entry = state
        .schedules
        .publish_slots(&doctor_id, request.date, request.slots)
        .await?;

    Ok(Json(json!({
        "success": true,
        "doctor_id": entry.doctor_id,
        "date": entry.date,
        "open_slots": entry.open_slots(),
        "message": "Schedule published"
    })))
}

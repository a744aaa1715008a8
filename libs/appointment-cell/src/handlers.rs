use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{
    parse_instant, AppointmentError, BookAppointmentRequest, RescheduleAppointmentRequest,
};
use crate::router::AppointmentCellState;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: String,
    pub at: String,
}

#[derive(Debug, Deserialize)]
pub struct DoctorDateQuery {
    pub doctor_id: String,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::PatientNotFound(_)
            | AppointmentError::DoctorNotFound(_)
            | AppointmentError::NotFound(_) => AppError::NotFound(message),
            AppointmentError::InvalidSlot(msg) => AppError::ValidationError(msg),
            AppointmentError::SlotUnavailable { reason, conflicting_appointment_id } => AppError::Conflict {
                code: "slot_unavailable".to_string(),
                message,
                details: Some(json!({
                    "reason": reason,
                    "conflicting_appointment_id": conflicting_appointment_id
                })),
            },
            AppointmentError::InvalidStatusTransition { from, to } => AppError::Conflict {
                code: "invalid_status_transition".to_string(),
                message,
                details: Some(json!({ "from": from, "to": to })),
            },
            AppointmentError::DuplicateId(_) => AppError::conflict("duplicate_id", message),
            AppointmentError::ConcurrentModification(_) => AppError::Unavailable {
                code: "concurrent_modification".to_string(),
                message,
            },
            AppointmentError::StorageUnavailable(_) => AppError::Unavailable {
                code: "storage_unavailable".to_string(),
                message,
            },
        }
    }
}

// ==============================================================================
// LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let scheduled_at = parse_instant(&request.scheduled_at)?;

    let appointment = state
        .booking
        .book(&request.patient_id, &request.doctor_id, scheduled_at, &request.notes)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(&appointment_id).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let new_scheduled_at = parse_instant(&request.scheduled_at)?;

    let appointment = state.booking.reschedule(&appointment_id, new_scheduled_at).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.cancel(&appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled successfully"
    })))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<Arc<AppointmentCellState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let scheduled_at = parse_instant(&query.at)?;

    let check = state.booking.check_availability(&query.doctor_id, scheduled_at).await?;

    Ok(Json(json!(check)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppointmentCellState>>,
    Query(query): Query<DoctorDateQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state.booking.available_slots(&query.doctor_id, query.date).await?;

    Ok(Json(json!({
        "doctor_id": query.doctor_id,
        "date": query.date,
        "available_slots": slots,
        "total_slots": slots.len()
    })))
}

// ==============================================================================
// REPORTING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointments_for_date(
    State(state): State<Arc<AppointmentCellState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.reporting.appointments_for_date(date).await?;

    Ok(Json(json!({
        "date": date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppointmentCellState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.reporting.appointments_for_patient(&patient_id).await?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppointmentCellState>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = state
        .reporting
        .appointments_for_doctor(&doctor_id, query.date)
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_daily_summary(
    State(state): State<Arc<AppointmentCellState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let summary = state.reporting.daily_summary(query.date).await?;

    Ok(Json(json!(summary)))
}

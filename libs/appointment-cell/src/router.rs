use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, patch},
};

use crate::handlers;
use crate::services::{AppointmentBookingService, AppointmentReportingService};

pub struct AppointmentCellState {
    pub booking: Arc<AppointmentBookingService>,
    pub reporting: Arc<AppointmentReportingService>,
}

pub fn appointment_routes(state: Arc<AppointmentCellState>) -> Router {
    Router::new()
        // Lifecycle
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))

        // Availability
        .route("/availability", get(handlers::check_availability))
        .route("/available-slots", get(handlers::get_available_slots))

        // Reporting
        .route("/summary", get(handlers::get_daily_summary))
        .route("/date/{date}", get(handlers::get_appointments_for_date))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_appointments))

        .with_state(state)
}

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;

use crate::state::ClinicServices;

pub fn create_router(services: &ClinicServices) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/doctors", doctor_routes(services.doctor_state()))
        .nest("/appointments", appointment_routes(services.appointment_state()))
}

use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};

use crate::handlers;
use crate::services::{DoctorService, ScheduleService};

pub struct DoctorCellState {
    pub doctors: Arc<DoctorService>,
    pub schedules: Arc<ScheduleService>,
}

pub fn doctor_routes(state: Arc<DoctorCellState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route(
            "/{doctor_id}/schedule",
            get(handlers::get_doctor_schedule).put(handlers::publish_schedule),
        )
        .with_state(state)
}

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use doctor_cell::models::Doctor;
use doctor_cell::services::{DoctorService, ScheduleService};
use shared_config::AppConfig;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid test date")
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("Invalid test time")
}

pub fn doctor(id: &str, name: &str, specialization: &str) -> Doctor {
    Doctor {
        id: id.to_string(),
        name: name.to_string(),
        specialization: specialization.to_string(),
        contact_info: None,
    }
}

pub async fn services() -> (Arc<DoctorService>, ScheduleService) {
    let config = AppConfig::default();
    let doctors = Arc::new(DoctorService::in_memory(&config));
    doctors
        .register_doctor(doctor("D1", "Dr. Alice Johnson", "Cardiology"))
        .await
        .expect("Failed to register doctor");

    let schedules = ScheduleService::in_memory(doctors.clone(), &config);
    (doctors, schedules)
}

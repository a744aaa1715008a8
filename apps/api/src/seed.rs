use anyhow::Context;
use chrono::{Days, NaiveDate, NaiveTime};
use tracing::info;

use doctor_cell::models::Doctor;
use doctor_cell::services::DoctorDirectory;
use patient_cell::models::Patient;

use crate::state::ClinicServices;

const SAMPLE_SCHEDULE_DAYS: u64 = 7;

const DOCTORS: [(&str, &str, &str, &str); 4] = [
    ("D10001", "Dr. Alice Johnson", "Cardiology", "555-9876"),
    ("D10002", "Dr. Bob Brown", "Neurology", "555-5432"),
    ("D10003", "Dr. Carol Davis", "Pediatrics", "555-1098"),
    ("D10004", "Dr. Daniel White", "Dermatology", "555-6543"),
];

// id, first, last, date of birth, phone, email, insurance, primary doctor
const PATIENTS: [(&str, &str, &str, &str, &str, &str, &str, &str); 8] = [
    ("P10001", "John", "Doe", "1980-05-15", "555-1234", "john.doe@email.com", "HealthPlus", "D10001"),
    ("P10002", "Jane", "Smith", "1990-08-22", "555-5678", "jane.smith@email.com", "MedCare", "D10002"),
    ("P10003", "Robert", "Johnson", "1975-12-03", "555-9012", "robert.j@email.com", "HealthPlus", "D10001"),
    ("P10004", "Sarah", "Williams", "1988-04-18", "555-3456", "sarah.w@email.com", "WellnessInc", "D10003"),
    ("P10005", "Michael", "Brown", "1965-11-30", "555-7890", "michael.b@email.com", "MedCare", "D10002"),
    ("P10006", "Emily", "Davis", "1995-02-14", "555-2345", "emily.d@email.com", "HealthPlus", "D10003"),
    ("P10007", "David", "Miller", "1982-07-09", "555-6789", "david.m@email.com", "WellnessInc", "D10001"),
    ("P10008", "Lisa", "Wilson", "1978-09-25", "555-0123", "lisa.w@email.com", "MedCare", "D10002"),
];

/// Register sample doctors and patients and open 09:00-17:00 for the next week.
///
/// Skipped when doctors are already registered, so restarting over a
/// persisted data directory keeps schedules published since. Returns whether
/// anything was seeded.
pub async fn seed_sample_data(services: &ClinicServices, today: NaiveDate) -> anyhow::Result<bool> {
    let existing = services.doctors.list_doctors().await?;
    if !existing.is_empty() {
        info!("Skipping sample data: {} doctors already registered", existing.len());
        return Ok(false);
    }

    for (id, name, specialization, contact) in DOCTORS {
        services
            .doctors
            .register_doctor(Doctor {
                id: id.to_string(),
                name: name.to_string(),
                specialization: specialization.to_string(),
                contact_info: Some(contact.to_string()),
            })
            .await?;
    }

    for (id, first_name, last_name, born, phone, email, insurance, primary_doctor) in PATIENTS {
        services
            .patients
            .register_patient(Patient {
                id: id.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                date_of_birth: NaiveDate::parse_from_str(born, "%Y-%m-%d")?,
                phone: phone.to_string(),
                email: email.to_string(),
                insurance_provider: Some(insurance.to_string()),
                primary_doctor: Some(primary_doctor.to_string()),
            })
            .await?;
    }

    let opens = NaiveTime::from_hms_opt(9, 0, 0).context("Invalid opening time")?;
    let closes = NaiveTime::from_hms_opt(17, 0, 0).context("Invalid closing time")?;
    for offset in 1..=SAMPLE_SCHEDULE_DAYS {
        let Some(date) = today.checked_add_days(Days::new(offset)) else {
            continue;
        };
        for (doctor_id, ..) in DOCTORS {
            services
                .schedules
                .publish_working_hours(doctor_id, date, opens, closes)
                .await?;
        }
    }

    info!(
        "Seeded {} doctors, {} patients and {} days of schedules",
        DOCTORS.len(),
        PATIENTS.len(),
        SAMPLE_SCHEDULE_DAYS
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctor_cell::services::ScheduleStore;
    use shared_config::AppConfig;

    #[tokio::test]
    async fn test_seeded_week_is_bookable() {
        let services = ClinicServices::open(&AppConfig::default())
            .await
            .expect("In-memory services should open");
        let today = NaiveDate::from_ymd_opt(2024, 1, 9).expect("Invalid date");

        assert!(seed_sample_data(&services, today).await.expect("Seeding should succeed"));

        let tomorrow = NaiveDate::from_ymd_opt(2024, 1, 10).expect("Invalid date");
        let slots = services.schedules.get_open_slots("D10004", tomorrow).await.unwrap();
        assert_eq!(slots.len(), 16);
        assert_eq!(slots.last().copied(), NaiveTime::from_hms_opt(16, 30, 0));

        // Today itself is not published
        assert!(services.schedules.get_open_slots("D10001", today).await.unwrap().is_empty());

        let appointment = services
            .booking
            .book("P10001", "D10001", tomorrow.and_hms_opt(9, 0, 0).unwrap(), "Routine checkup")
            .await
            .expect("Seeded slot should be bookable");
        assert_eq!(appointment.patient_id, "P10001");
    }

    #[tokio::test]
    async fn test_reseeding_keeps_published_schedules() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 9).expect("Invalid date");
        let tomorrow = NaiveDate::from_ymd_opt(2024, 1, 10).expect("Invalid date");
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();

        {
            let services = ClinicServices::open(&config).await.expect("Services should open");
            assert!(seed_sample_data(&services, today).await.unwrap());
            services
                .schedules
                .publish_slots("D10001", tomorrow, vec![ten])
                .await
                .expect("Publishing should succeed");
        }

        let restarted = ClinicServices::open(&config).await.expect("Services should reopen");
        assert!(!seed_sample_data(&restarted, today).await.unwrap());

        let slots = restarted.schedules.get_open_slots("D10001", tomorrow).await.unwrap();
        assert_eq!(slots, vec![ten]);
    }
}

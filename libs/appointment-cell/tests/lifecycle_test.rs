mod common;

use assert_matches::assert_matches;
use tokio_test::{assert_err, assert_ok};

use appointment_cell::models::{AppointmentError, AppointmentStatus, UnavailableReason};
use appointment_cell::services::AppointmentLifecycleService;

use common::{at, clinic, date};

#[tokio::test]
async fn test_book_reschedule_cancel_scenario() {
    let clinic = clinic().await;
    let booking = &clinic.booking;

    let a1 = booking
        .book("P1", "D1", at("2024-01-10T09:00"), "")
        .await
        .expect("First booking should succeed");
    assert_eq!(a1.status, AppointmentStatus::Scheduled);

    let err = assert_err!(booking.book("P2", "D1", at("2024-01-10T09:00"), "").await);
    assert_matches!(
        err,
        AppointmentError::SlotUnavailable {
            reason: UnavailableReason::AlreadyBooked,
            conflicting_appointment_id: Some(ref id),
        } if *id == a1.id
    );

    let moved = booking
        .reschedule(&a1.id, at("2024-01-10T09:30"))
        .await
        .expect("Reschedule should succeed");
    assert_eq!(moved.status, AppointmentStatus::Rescheduled);
    assert_eq!(moved.scheduled_at, at("2024-01-10T09:30"));
    assert_eq!(moved.created_at, a1.created_at);

    // 09:00 was freed by the reschedule
    let a2 = assert_ok!(booking.book("P2", "D1", at("2024-01-10T09:00"), "").await);
    assert_ne!(a2.id, a1.id);

    let cancelled = assert_ok!(booking.cancel(&a1.id).await);
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let err = assert_err!(booking.reschedule(&a1.id, at("2024-01-10T09:30")).await);
    assert_matches!(
        err,
        AppointmentError::InvalidStatusTransition {
            from: AppointmentStatus::Cancelled,
            to: AppointmentStatus::Rescheduled,
        }
    );
}

#[tokio::test]
async fn test_second_cancel_is_rejected() {
    let clinic = clinic().await;
    let appointment = clinic
        .booking
        .book("P1", "D1", at("2024-01-10T09:00"), "follow-up")
        .await
        .unwrap();

    let cancelled = assert_ok!(clinic.booking.cancel(&appointment.id).await);
    assert_eq!(cancelled.scheduled_at, appointment.scheduled_at);
    assert_eq!(cancelled.notes, "follow-up");

    let err = assert_err!(clinic.booking.cancel(&appointment.id).await);
    assert_matches!(err, AppointmentError::InvalidStatusTransition { .. });

    // Cancellation is soft; the record is still there
    let stored = clinic.booking.get_appointment(&appointment.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_reschedule_to_own_slot_is_not_a_conflict() {
    let clinic = clinic().await;
    let appointment = clinic
        .booking
        .book("P1", "D1", at("2024-01-10T09:00"), "")
        .await
        .unwrap();

    let same = assert_ok!(clinic.booking.reschedule(&appointment.id, at("2024-01-10T09:00")).await);
    assert_eq!(same.status, AppointmentStatus::Rescheduled);
    assert_eq!(same.scheduled_at, appointment.scheduled_at);
}

#[tokio::test]
async fn test_reschedule_onto_another_booking_is_rejected() {
    let clinic = clinic().await;
    let first = clinic.booking.book("P1", "D1", at("2024-01-10T09:00"), "").await.unwrap();
    let second = clinic.booking.book("P2", "D1", at("2024-01-10T09:30"), "").await.unwrap();

    let err = assert_err!(clinic.booking.reschedule(&second.id, at("2024-01-10T09:00")).await);
    assert_matches!(
        err,
        AppointmentError::SlotUnavailable {
            reason: UnavailableReason::AlreadyBooked,
            conflicting_appointment_id: Some(ref id),
        } if *id == first.id
    );

    // Nothing was committed
    let unchanged = clinic.booking.get_appointment(&second.id).await.unwrap();
    assert_eq!(unchanged, second);
}

#[tokio::test]
async fn test_unknown_patient_doctor_and_appointment_are_not_found() {
    let clinic = clinic().await;

    let err = assert_err!(clinic.booking.book("P404", "D1", at("2024-01-10T09:00"), "").await);
    assert_matches!(err, AppointmentError::PatientNotFound(ref id) if id == "P404");

    let err = assert_err!(clinic.booking.book("P1", "D404", at("2024-01-10T09:00"), "").await);
    assert_matches!(err, AppointmentError::DoctorNotFound(ref id) if id == "D404");

    let err = assert_err!(clinic.booking.cancel("missing").await);
    assert_matches!(err, AppointmentError::NotFound(_));

    let err = assert_err!(clinic.booking.reschedule("missing", at("2024-01-10T09:30")).await);
    assert_matches!(err, AppointmentError::NotFound(_));

    assert!(clinic.reporting.appointments_for_date(date("2024-01-10")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unstaffed_and_misaligned_slots() {
    let clinic = clinic().await;

    let err = assert_err!(clinic.booking.book("P1", "D1", at("2024-01-10T10:00"), "").await);
    assert_matches!(
        err,
        AppointmentError::SlotUnavailable {
            reason: UnavailableReason::NotStaffed,
            conflicting_appointment_id: None,
        }
    );

    let err = assert_err!(clinic.booking.book("P1", "D1", at("2024-01-10T09:15"), "").await);
    assert_matches!(err, AppointmentError::InvalidSlot(_));
    assert!(!err.is_retryable());
}

#[test]
fn test_transition_table() {
    let lifecycle = AppointmentLifecycleService::new();

    assert_eq!(
        lifecycle.get_valid_transitions(&AppointmentStatus::Scheduled),
        vec![AppointmentStatus::Rescheduled, AppointmentStatus::Cancelled]
    );
    assert_eq!(
        lifecycle.get_valid_transitions(&AppointmentStatus::Rescheduled),
        vec![AppointmentStatus::Rescheduled, AppointmentStatus::Cancelled]
    );
    assert!(lifecycle.get_valid_transitions(&AppointmentStatus::Cancelled).is_empty());

    assert_ok!(lifecycle.validate_status_transition(&AppointmentStatus::Rescheduled, &AppointmentStatus::Rescheduled));
    assert_err!(lifecycle.validate_status_transition(&AppointmentStatus::Scheduled, &AppointmentStatus::Scheduled));
}

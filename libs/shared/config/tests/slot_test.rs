use assert_matches::assert_matches;
use chrono::NaiveTime;

use shared_config::{AppConfig, GranularityError, SlotGranularity};

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[test]
fn test_granularity_rejects_zero_and_uneven_lengths() {
    assert_matches!(SlotGranularity::new(0), Err(GranularityError::Zero));
    assert_matches!(SlotGranularity::new(7), Err(GranularityError::Uneven(7)));
    assert!(SlotGranularity::new(15).is_ok());
    assert!(SlotGranularity::new(60).is_ok());
}

#[test]
fn test_alignment_checks_minutes_and_seconds() {
    let granularity = SlotGranularity::default();

    assert!(granularity.is_aligned(hm(9, 0)));
    assert!(granularity.is_aligned(hm(9, 30)));
    assert!(!granularity.is_aligned(hm(9, 15)));
    assert!(!granularity.is_aligned(NaiveTime::from_hms_opt(9, 0, 10).unwrap()));
}

#[test]
fn test_slots_between_is_half_open_and_rounds_up() {
    let granularity = SlotGranularity::default();

    let slots = granularity.slots_between(hm(9, 0), hm(11, 0));
    assert_eq!(slots, vec![hm(9, 0), hm(9, 30), hm(10, 0), hm(10, 30)]);

    let slots = granularity.slots_between(hm(9, 10), hm(10, 30));
    assert_eq!(slots, vec![hm(9, 30), hm(10, 0)]);

    assert!(granularity.slots_between(hm(12, 0), hm(12, 0)).is_empty());
}

#[test]
fn test_granularity_serializes_as_minutes() {
    let granularity = SlotGranularity::new(15).unwrap();
    let minutes: u32 = granularity.into();
    assert_eq!(minutes, 15);
    assert_matches!(SlotGranularity::try_from(50), Err(GranularityError::Uneven(50)));
}

#[test]
fn test_table_path_only_when_persistent() {
    let mut config = AppConfig::default();
    assert!(config.table_path("appointments").is_none());

    config.data_dir = Some("/var/lib/clinic".into());
    assert_eq!(
        config.table_path("appointments").unwrap(),
        std::path::PathBuf::from("/var/lib/clinic/appointments.json")
    );
}

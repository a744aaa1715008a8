pub mod doctor;
pub mod schedule;

pub use doctor::{DoctorDirectory, DoctorService};
pub use schedule::{ScheduleService, ScheduleStore};

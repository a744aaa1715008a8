pub mod patient;

pub use patient::{PatientDirectory, PatientService};

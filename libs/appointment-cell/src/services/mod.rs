pub mod availability;
pub mod booking;
pub mod consistency;
pub mod ledger;
pub mod lifecycle;
pub mod reporting;

pub use availability::AvailabilityResolver;
pub use booking::AppointmentBookingService;
pub use consistency::{DoctorLock, SchedulingConsistencyService};
pub use ledger::{AppointmentLedger, TableAppointmentLedger};
pub use lifecycle::AppointmentLifecycleService;
pub use reporting::AppointmentReportingService;

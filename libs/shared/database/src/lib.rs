pub mod error;
pub mod table;

pub use error::DatabaseError;
pub use table::{Record, Table, Versioned};

//! Domain entities and value types
//!
//! Pure business logic with no I/O dependencies: validated newtypes,
//! the transfer item lifecycle, batch reports, and the error taxonomy.

pub mod errors;
pub mod newtypes;
pub mod report;
pub mod transfer;

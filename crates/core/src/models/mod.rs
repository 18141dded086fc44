pub mod actor;
pub mod booking;
pub mod customer;
pub mod directory;
pub mod leave;
pub mod schedule;

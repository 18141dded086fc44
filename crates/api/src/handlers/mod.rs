pub mod booking;
pub mod jobs;
pub mod leave;
pub mod schedule;

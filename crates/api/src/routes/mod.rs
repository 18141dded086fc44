pub mod booking;
pub mod health;
pub mod jobs;
pub mod leave;
pub mod schedule;

//! # SalonBook Core
//!
//! Domain types and rules for salon appointment scheduling: the shift
//! calendar, schedule and slot models, the leave and booking state machines,
//! and the cancellation and loyalty policies. Nothing in this crate performs
//! I/O; persistence lives in `salonbook-db` and the HTTP surface and jobs in
//! `salonbook-api`.

pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod notify;
pub mod policy;
pub mod shift;

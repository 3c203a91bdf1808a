//! Booking rules shared by the HTTP handlers: admission checks, recurrence
//! expansion, grouping of per-date rows, usage ratios and slot labels

#[macro_use]
extern crate tracing;

pub mod admission;
pub mod grouping;
pub mod recurrence;
pub mod slot;
pub mod usage;

#[macro_use]
extern crate tracing;

mod filter;
mod incident;
mod lab;
mod participant;
mod quarter;
mod reservation;
mod time_slot;

pub use db::{ParticipantRole, QuarterId, ReservationState};
pub use filter::*;
pub use incident::*;
pub use lab::*;
pub use participant::*;
pub use quarter::*;
pub use reservation::*;
pub use time_slot::*;

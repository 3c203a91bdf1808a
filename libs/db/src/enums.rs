use std::fmt;

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(
	Clone,
	Copy,
	DbEnum,
	Debug,
	Default,
	Deserialize,
	Hash,
	PartialEq,
	Eq,
	Serialize,
)]
#[ExistingTypePath = "crate::sql_types::ReservationState"]
pub enum ReservationState {
	#[default]
	Pending,
	Approved,
	Rejected,
}

/// The category a participant books under, this drives the admission quotas
#[derive(
	Clone,
	Copy,
	DbEnum,
	Debug,
	Default,
	Deserialize,
	Hash,
	PartialEq,
	Eq,
	Serialize,
)]
#[ExistingTypePath = "crate::sql_types::ParticipantRole"]
pub enum ParticipantRole {
	#[default]
	Student,
	Faculty,
	Staff,
	Other,
}

impl ParticipantRole {
	#[must_use]
	pub fn is_student(self) -> bool { self == Self::Student }
}

impl fmt::Display for ParticipantRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Student => "student",
			Self::Faculty => "faculty",
			Self::Staff => "staff",
			Self::Other => "other",
		};

		write!(f, "{name}")
	}
}

#[derive(
	Clone,
	Copy,
	DbEnum,
	Debug,
	Deserialize,
	Hash,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Serialize,
)]
#[ExistingTypePath = "crate::sql_types::QuarterId"]
pub enum QuarterId {
	Q1,
	Q2,
	Q3,
	Q4,
}

use models::Lab;
use serde::{Deserialize, Serialize};
use validator_derive::Validate;

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabRequest {
	#[validate(length(
		min = 1,
		max = 64,
		message = "lab name must be between 1 and 64 characters long",
		code = "lab-name-length"
	))]
	pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeSlotRequest {
	#[validate(length(
		min = 1,
		max = 32,
		message = "time slot label must be between 1 and 32 characters long",
		code = "time-slot-label-length"
	))]
	pub label: String,
}

/// Number of approved reservations of a lab
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabReservationCount {
	pub lab:          Lab,
	pub reservations: i64,
}

impl From<(Lab, i64)> for LabReservationCount {
	fn from((lab, reservations): (Lab, i64)) -> Self {
		Self { lab, reservations }
	}
}

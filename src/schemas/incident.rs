use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator_derive::Validate;

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentRequest {
	pub lab_id:      i32,
	#[validate(length(
		min = 1,
		max = 2048,
		message = "description must be between 1 and 2048 characters long",
		code = "description-length"
	))]
	pub description: String,
	pub occurred_at: Option<NaiveDateTime>,
	#[validate(url(message = "invalid report url", code = "url"))]
	pub report_url:  Option<String>,
}

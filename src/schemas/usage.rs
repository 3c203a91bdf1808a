use booking::usage::LabUsage;
use chrono::NaiveDate;
use db::QuarterId;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator_derive::Validate;

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UsageQuery {
	pub quarter:           Option<QuarterId>,
	pub from:              Option<NaiveDate>,
	pub until:             Option<NaiveDate>,
	pub lab_id:            Option<i32>,
	#[validate(range(
		min = 1.0,
		max = 24.0,
		message = "max hours per day must be between 1 and 24",
		code = "max-hours-range"
	))]
	pub max_hours_per_day: Option<f64>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
	pub quarter:           Option<QuarterId>,
	pub from:              NaiveDate,
	pub until:             NaiveDate,
	pub max_hours_per_day: f64,
	pub labs:              Vec<LabUsage>,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterRequest {
	pub starts_on: NaiveDate,
	pub ends_on:   NaiveDate,
}

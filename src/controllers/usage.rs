use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use booking::usage::usage_per_lab;
use common::{DbPool, Error};
use models::{Lab, Quarter, Reservation};
use validator::Validate;

use crate::Config;
use crate::schemas::usage::{UsageQuery, UsageResponse};

#[instrument(skip(config, pool))]
pub(crate) async fn get_usage(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	Query(query): Query<UsageQuery>,
) -> Result<impl IntoResponse, Error> {
	query.validate()?;

	let conn = pool.get().await?;

	let (from, until) = match (query.quarter, query.from, query.until) {
		(Some(quarter), ..) => {
			let quarter = Quarter::get_by_id(quarter, &conn).await?;

			(quarter.starts_on, quarter.ends_on)
		},
		(None, Some(from), Some(until)) => (from, until),
		_ => {
			return Err(Error::MissingRequestData(
				"either a quarter or both from and until are required"
					.to_string(),
			));
		},
	};

	if from > until {
		return Err(Error::ValidationError(format!(
			"usage window starts on {from} after it ends on {until}"
		)));
	}

	let max_hours_per_day =
		query.max_hours_per_day.unwrap_or(config.max_hours_per_day);

	let labs = match query.lab_id {
		Some(l_id) => vec![Lab::get_by_id(l_id, &conn).await?],
		None => Lab::get_all(&conn).await?,
	};

	let pairs =
		Reservation::approved_slot_pairs(query.lab_id, from, until, &conn)
			.await?;

	let response = UsageResponse {
		quarter: query.quarter,
		from,
		until,
		max_hours_per_day,
		labs: usage_per_lab(labs, &pairs, max_hours_per_day),
	};

	Ok((StatusCode::OK, Json(response)))
}

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use booking::slot::SlotSpan;
use common::{DbPool, Error};
use models::{NewTimeSlot, TimeSlot};
use validator::Validate;

use crate::schemas::lab::CreateTimeSlotRequest;

#[instrument(skip(pool))]
pub(crate) async fn get_time_slots(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;
	let slots = TimeSlot::get_all(&conn).await?;

	Ok((StatusCode::OK, Json(slots)))
}

#[instrument(skip(pool))]
pub(crate) async fn create_time_slot(
	State(pool): State<DbPool>,
	Json(request): Json<CreateTimeSlotRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let label = request.label.trim().to_string();

	if SlotSpan::parse(&label).is_none() {
		return Err(Error::ValidationError(format!(
			"'{label}' is not a time range like '08:00 am - 09:20 am'"
		)));
	}

	let conn = pool.get().await?;
	let slot = NewTimeSlot { label }.insert(&conn).await?;

	Ok((StatusCode::CREATED, Json(slot)))
}

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use db::ReservationState;
use models::{Reservation, ReservationFilter};

use crate::schemas::calendar::{CalendarEvent, CalendarQuery};

#[instrument(skip(pool))]
pub(crate) async fn get_calendar(
	State(pool): State<DbPool>,
	Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, Error> {
	let filter = ReservationFilter {
		state: Some(ReservationState::Approved),
		lab_id: query.lab_id,
		from: query.from,
		until: query.until,
		..ReservationFilter::default()
	};

	let conn = pool.get().await?;
	let rows = Reservation::list(filter, &conn).await?;

	Ok((StatusCode::OK, Json(CalendarEvent::from_reservations(&rows))))
}

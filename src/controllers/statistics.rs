use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use models::Reservation;

use crate::schemas::lab::LabReservationCount;

#[instrument(skip(pool))]
pub(crate) async fn get_reservations_per_lab(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let counts: Vec<LabReservationCount> =
		Reservation::approved_counts_per_lab(&conn)
			.await?
			.into_iter()
			.map(Into::into)
			.collect();

	Ok((StatusCode::OK, Json(counts)))
}

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use db::QuarterId;
use models::Quarter;

use crate::schemas::quarter::QuarterRequest;

#[instrument(skip(pool))]
pub(crate) async fn get_quarters(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;
	let quarters = Quarter::get_all(&conn).await?;

	Ok((StatusCode::OK, Json(quarters)))
}

#[instrument(skip(pool))]
pub(crate) async fn upsert_quarter(
	State(pool): State<DbPool>,
	Path(id): Path<QuarterId>,
	Json(request): Json<QuarterRequest>,
) -> Result<impl IntoResponse, Error> {
	if request.starts_on > request.ends_on {
		return Err(Error::ValidationError(format!(
			"quarter {id:?} starts on {} after it ends on {}",
			request.starts_on, request.ends_on
		)));
	}

	let conn = pool.get().await?;

	let quarter = Quarter {
		id,
		starts_on: request.starts_on,
		ends_on: request.ends_on,
	}
	.upsert(&conn)
	.await?;

	Ok((StatusCode::OK, Json(quarter)))
}

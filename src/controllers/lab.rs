use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use models::{Lab, NewLab};
use validator::Validate;

use crate::schemas::lab::CreateLabRequest;

#[instrument(skip(pool))]
pub(crate) async fn get_labs(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;
	let labs = Lab::get_all(&conn).await?;

	Ok((StatusCode::OK, Json(labs)))
}

#[instrument(skip(pool))]
pub(crate) async fn create_lab(
	State(pool): State<DbPool>,
	Json(request): Json<CreateLabRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;
	let lab = NewLab { name: request.name.trim().to_string() }
		.insert(&conn)
		.await?;

	Ok((StatusCode::CREATED, Json(lab)))
}

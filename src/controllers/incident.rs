use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use models::{Incident, IncidentFilter, NewIncident};
use validator::Validate;

use crate::schemas::incident::CreateIncidentRequest;
use crate::schemas::pagination::PaginationOptions;
use crate::session::Session;

#[instrument(skip(pool))]
pub(crate) async fn create_incident(
	State(pool): State<DbPool>,
	session: Session,
	Json(request): Json<CreateIncidentRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let new_incident = NewIncident {
		lab_id:         request.lab_id,
		description:    request.description,
		reporter_email: session.data.email,
		occurred_at:    request.occurred_at,
		report_url:     request.report_url,
	};

	let conn = pool.get().await?;
	let incident = new_incident.insert(&conn).await?;

	Ok((StatusCode::CREATED, Json(incident)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_incidents(
	State(pool): State<DbPool>,
	Query(filter): Query<IncidentFilter>,
	Query(p_opts): Query<PaginationOptions>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let (total, incidents) =
		Incident::search(filter, p_opts.limit(), p_opts.offset(), &conn).await?;

	Ok((StatusCode::OK, Json(p_opts.paginate(total, incidents))))
}

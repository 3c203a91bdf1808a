use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::Error;
use validator::Validate;

use crate::mailer::Mailer;
use crate::schemas::mail::MailRequest;
use crate::session::AdminSession;

#[instrument(skip(mailer, session, request))]
pub(crate) async fn relay_mail(
	State(mailer): State<Mailer>,
	session: AdminSession,
	Json(request): Json<MailRequest>,
) -> Result<StatusCode, Error> {
	request.validate()?;

	mailer.relay(&request.to, &request.subject, request.body)?;

	debug!("{} relayed a mail to {}", session.data.email, request.to);

	Ok(StatusCode::ACCEPTED)
}

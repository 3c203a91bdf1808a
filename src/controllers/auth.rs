//! Controllers for logging in and out

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::Json;
use axum::extract::State;
use axum::response::NoContent;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use common::{Error, LoginError, RedisConn};
use validator::Validate;

use crate::Config;
use crate::schemas::auth::{LoginRequest, SessionResponse};
use crate::session::{Session, SessionData};

/// Check that an administrator supplied the configured password
fn verify_admin_password(
	config: &Config,
	password: Option<&str>,
) -> Result<(), Error> {
	let Some(password) = password else {
		return Err(LoginError::PasswordRequired.into());
	};

	let Some(hash) = config.admin_password_hash.as_deref() else {
		warn!("admin login attempted but no admin password hash is configured");

		return Err(LoginError::InvalidPassword.into());
	};

	let password_hash = PasswordHash::new(hash)?;
	Argon2::default().verify_password(password.as_bytes(), &password_hash)?;

	Ok(())
}

#[instrument(skip(config, r_conn, jar))]
pub(crate) async fn login(
	State(config): State<Config>,
	State(mut r_conn): State<RedisConn>,
	jar: PrivateCookieJar,
	Json(login_data): Json<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<SessionResponse>), Error> {
	login_data.validate()?;

	let email = login_data.email.trim().to_lowercase();

	if !config.institutional_email.is_match(&email) {
		return Err(LoginError::InvalidEmail(email).into());
	}

	let is_admin = config.is_admin_email(&email);

	if is_admin {
		verify_admin_password(&config, login_data.password.as_deref())?;
	}

	let session = Session::create(
		config.access_cookie_lifetime,
		SessionData { email, is_admin },
		&mut r_conn,
	)
	.await?;

	let access_token_cookie = session.to_access_token_cookie(
		config.access_cookie_name.clone(),
		config.access_cookie_lifetime,
		config.production,
	);

	info!("logged in {} (admin: {is_admin})", session.data.email);

	Ok((jar.add(access_token_cookie), Json(session.data.into())))
}

#[instrument(skip(config, r_conn, jar))]
pub(crate) async fn logout(
	State(config): State<Config>,
	State(mut r_conn): State<RedisConn>,
	jar: PrivateCookieJar,
	session: Session,
) -> Result<(PrivateCookieJar, NoContent), Error> {
	Session::delete(session.id, &mut r_conn).await?;

	let revoked_access_token = Cookie::build((config.access_cookie_name, ""))
		.http_only(true)
		.max_age(time::Duration::hours(-1))
		.path("/")
		.same_site(SameSite::Lax)
		.secure(config.production);

	info!("logged out {}", session.data.email);

	Ok((jar.add(revoked_access_token), NoContent))
}

#[instrument]
pub(crate) async fn get_current_session(
	session: Session,
) -> Json<SessionResponse> {
	Json(session.data.into())
}

//! User sessions and access tokens

use axum::RequestPartsExt;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite};
use common::{Error, InternalServerError, RedisConn};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::AppState;

/// Id of an authorized session, stored on the request by the
/// [`AuthLayer`](crate::middleware::AuthLayer)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

/// A session for any logged in user
///
/// ```rs
/// pub async fn foo_route(session: Session) -> impl IntoResponse {
///     println!("{:?}", session.data.email);
///
///     ()
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Session {
	pub id:   Uuid,
	pub data: SessionData,
}

/// A session for an administrator
#[derive(Clone, Debug)]
pub struct AdminSession {
	pub id:   Uuid,
	pub data: SessionData,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
	pub email:    String,
	pub is_admin: bool,
}

fn cache_key(id: Uuid) -> String { format!("session:{id}") }

impl FromRequestParts<AppState> for Session {
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let Some(&SessionId(session_id)) = parts.extensions.get::<SessionId>()
		else {
			return Err(InternalServerError::SessionWithoutAuthError.into());
		};

		let State(mut conn) = parts
			.extract_with_state::<State<RedisConn>, AppState>(state)
			.await
			.map_err(|_| Error::InternalServerError)?;

		let session = Self::get(session_id, &mut conn).await?;

		let Some(session) = session else {
			return Err(Error::Infallible(
				"failed to retrieve session despite passing auth middleware"
					.to_string(),
			));
		};

		Ok(session)
	}
}

impl FromRequestParts<AppState> for AdminSession {
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let session =
			parts.extract_with_state::<Session, AppState>(state).await?;

		if !session.data.is_admin {
			return Err(Error::Forbidden);
		}

		Ok(Self { id: session.id, data: session.data })
	}
}

impl Session {
	/// Create and store a new [`Session`] for a logged in email
	#[instrument(skip(conn))]
	pub async fn create(
		lifetime: Duration,
		data: SessionData,
		conn: &mut RedisConn,
	) -> Result<Self, Error> {
		let id = Uuid::new_v4();

		// Add a buffer of 10 seconds to ensure the cached session doesn't
		// expire before the session cookie does
		let expiry = u64::try_from(lifetime.whole_seconds() + 10).unwrap_or(10);

		let serialized = serde_json::to_string(&data)
			.map_err(InternalServerError::SerdeJsonError)?;

		let _: () = conn.set_ex(cache_key(id), serialized, expiry).await?;

		debug!("stored session {id} in cache for {}", data.email);

		Ok(Self { id, data })
	}

	/// Get a session from the cache
	#[instrument(skip(conn))]
	pub async fn get(
		id: Uuid,
		conn: &mut RedisConn,
	) -> Result<Option<Self>, Error> {
		let data_string: Option<String> = conn.get(cache_key(id)).await?;

		let Some(data_string) = data_string.as_ref() else {
			return Ok(None);
		};

		let data: SessionData = serde_json::from_str(data_string)
			.map_err(InternalServerError::SerdeJsonError)?;

		Ok(Some(Self { id, data }))
	}

	/// Remove a session given its id
	#[instrument(skip(conn))]
	pub async fn delete(id: Uuid, conn: &mut RedisConn) -> Result<(), Error> {
		let _: i32 = conn.del(cache_key(id)).await?;

		Ok(())
	}

	/// Check if a session with this id exists
	#[instrument(skip(conn))]
	pub async fn exists(id: Uuid, conn: &mut RedisConn) -> Result<bool, Error> {
		let exists: i32 = conn.exists(cache_key(id)).await?;

		Ok(exists == 1)
	}

	/// Convert this [`Session`] into an access token cookie
	#[must_use]
	pub fn to_access_token_cookie(
		&self,
		name: String,
		lifetime: Duration,
		secure: bool,
	) -> Cookie<'static> {
		Cookie::build((name, self.id.to_string()))
			.http_only(true)
			.max_age(lifetime)
			.path("/")
			.same_site(SameSite::Lax)
			.secure(secure)
			.into()
	}
}

use serde::{Deserialize, Serialize};
use validator_derive::Validate;

use crate::session::SessionData;

#[derive(Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
	#[validate(email(message = "invalid email", code = "email"))]
	pub email:    String,
	pub password: Option<String>,
}

impl std::fmt::Debug for LoginRequest {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &self.password.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
	pub email:    String,
	pub is_admin: bool,
}

impl From<SessionData> for SessionResponse {
	fn from(value: SessionData) -> Self {
		Self { email: value.email, is_admin: value.is_admin }
	}
}

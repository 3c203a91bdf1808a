use serde::{Deserialize, Serialize};
use validator_derive::Validate;

/// A mail to relay through the app mailer
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct MailRequest {
	#[serde(rename = "destinatario")]
	#[validate(email(message = "invalid recipient", code = "email"))]
	pub to:      String,
	#[serde(rename = "asunto")]
	#[validate(length(
		min = 1,
		max = 255,
		message = "subject must be between 1 and 255 characters long",
		code = "subject-length"
	))]
	pub subject: String,
	#[serde(rename = "cuerpo")]
	#[validate(length(min = 1, message = "body may not be empty", code = "body"))]
	pub body:    String,
}

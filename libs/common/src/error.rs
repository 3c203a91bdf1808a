//! Library-wide error types and [`From`] impls

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use db::ParticipantRole;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;
use tokio::sync::mpsc;

/// Top level application error, can be converted into a [`Response`]
#[derive(Debug, Error)]
pub enum Error {
	/// Duplicate resource created
	#[error("{0}")]
	Duplicate(String),
	/// Request/operation forbidden
	#[error("forbidden")]
	Forbidden,
	/// An error that should never happen
	#[error("{0}")]
	Infallible(String),
	/// Opaque internal server error
	#[error("internal server error")]
	InternalServerError,
	/// Resource not found
	#[error("not found - {0}")]
	NotFound(String),
	/// Any error related to logging in
	#[error(transparent)]
	LoginError(#[from] LoginError),
	/// Invalid or missing token
	#[error(transparent)]
	TokenError(#[from] TokenError),
	/// Any error related to creating a reservation
	#[error(transparent)]
	CreateReservationError(#[from] CreateReservationError),
	/// A reservation would break the occupancy rules of a slot
	#[error(transparent)]
	AdmissionConflict(#[from] AdmissionConflict),
	/// Some data in the request was missing
	#[error("{0}")]
	MissingRequestData(String),
	/// Resource could not be validated
	#[error("{0}")]
	ValidationError(String),
}

impl Error {
	/// Return a unique identifying code for this error
	///
	/// When modifying this function the error code should only ever increase,
	/// an error code should never be reused once its assigned to avoid
	/// unexpectedly breaking the frontend
	fn code(&self) -> i32 {
		match self {
			Self::Duplicate(_) => 1,
			Self::Forbidden => 2,
			Self::Infallible(_) => 3,
			Self::InternalServerError => 4,
			Self::NotFound(_) => 5,
			Self::LoginError(e) => {
				match e {
					LoginError::InvalidEmail(_) => 6,
					LoginError::PasswordRequired => 7,
					LoginError::InvalidPassword => 8,
				}
			},
			Self::TokenError(e) => {
				match e {
					TokenError::MissingAccessToken => 9,
					TokenError::MissingSession => 10,
				}
			},
			Self::CreateReservationError(e) => {
				match e {
					CreateReservationError::NoTimeSlots => 11,
					CreateReservationError::TooManyTimeSlots(_) => 12,
					CreateReservationError::TooManyMembers(_) => 13,
					CreateReservationError::MembersNotAllowed => 14,
					CreateReservationError::RepeatNotAllowed => 15,
					CreateReservationError::InvalidRange { .. } => 16,
					CreateReservationError::RangeTooLong(_) => 17,
					CreateReservationError::NoRepeatDays => 18,
					CreateReservationError::NoMatchingDates => 19,
				}
			},
			Self::AdmissionConflict(c) => {
				match c.reason {
					AdmissionError::StudentQuotaReached(_) => 20,
					AdmissionError::OtherCategory => 21,
					AdmissionError::AlreadyHeld(_) => 22,
					AdmissionError::Unverifiable => 23,
				}
			},
			Self::MissingRequestData(_) => 24,
			Self::ValidationError(_) => 25,
		}
	}

	/// Return additional information about the error
	fn info(&self) -> Option<String> {
		match self {
			Self::Duplicate(m)
			| Self::NotFound(m)
			| Self::LoginError(LoginError::InvalidEmail(m))
			| Self::MissingRequestData(m)
			| Self::ValidationError(m) => Some(m.to_owned()),
			Self::CreateReservationError(e) => {
				match e {
					CreateReservationError::TooManyTimeSlots(max)
					| CreateReservationError::TooManyMembers(max) => {
						Some(serde_json::json!({ "max": max }).to_string())
					},
					CreateReservationError::InvalidRange { start, end } => {
						Some(
							serde_json::json!({ "start": start, "end": end })
								.to_string(),
						)
					},
					CreateReservationError::RangeTooLong(days) => {
						Some(serde_json::json!({ "maxDays": days }).to_string())
					},
					_ => None,
				}
			},
			Self::AdmissionConflict(c) => {
				Some(
					serde_json::json!({
						"labId": c.lab_id,
						"date": c.date,
						"timeSlotId": c.time_slot_id,
					})
					.to_string(),
				)
			},
			_ => None,
		}
	}
}

/// Convert an error into a [`Response`]
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		debug!("{self:?}");

		let message = self.to_string();

		let data = serde_json::json!({
			"message": message,
			"code": self.code(),
			"info": self.info(),
		});

		let status = match self {
			Self::Duplicate(_) => StatusCode::CONFLICT,
			Self::InternalServerError | Self::Infallible(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			},
			Self::TokenError(_) => StatusCode::UNAUTHORIZED,
			Self::Forbidden
			| Self::LoginError(
				LoginError::PasswordRequired | LoginError::InvalidPassword,
			) => StatusCode::FORBIDDEN,
			Self::CreateReservationError(_) => StatusCode::BAD_REQUEST,
			Self::AdmissionConflict(AdmissionConflict {
				reason: AdmissionError::Unverifiable,
				..
			}) => StatusCode::SERVICE_UNAVAILABLE,
			Self::AdmissionConflict(_) => StatusCode::CONFLICT,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::LoginError(LoginError::InvalidEmail(_))
			| Self::MissingRequestData(_)
			| Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
		};

		(status, axum::Json(data)).into_response()
	}
}

/// Any error related to logging in
#[derive(Debug, Error)]
pub enum LoginError {
	#[error("'{0}' is not a valid institutional email")]
	InvalidEmail(String),
	#[error("a password is required for this account")]
	PasswordRequired,
	#[error("invalid password")]
	InvalidPassword,
}

/// Any error related to a token
#[derive(Debug, Error)]
pub enum TokenError {
	#[error("missing or invalid access token")]
	MissingAccessToken,
	#[error("missing session")]
	MissingSession,
}

/// Any error related to a booking request
#[derive(Debug, Error)]
pub enum CreateReservationError {
	/// No time slot was selected
	#[error("at least one time slot must be selected")]
	NoTimeSlots,
	/// More time slots were selected than the role allows
	#[error("too many time slots selected")]
	TooManyTimeSlots(usize),
	/// More additional members were listed than allowed
	#[error("too many additional members")]
	TooManyMembers(usize),
	/// Additional members were listed for a role that books alone
	#[error("only students may list additional members")]
	MembersNotAllowed,
	/// A repeating schedule was requested by a role that may not repeat
	#[error("students may only book a single date")]
	RepeatNotAllowed,
	/// The repeat range ends before it starts
	#[error("the end date lies before the start date")]
	InvalidRange { start: NaiveDate, end: NaiveDate },
	/// The repeat range spans too many days
	#[error("the repeat range is too long")]
	RangeTooLong(i64),
	/// A repeating schedule without any weekday selected
	#[error("at least one weekday must be selected")]
	NoRepeatDays,
	/// The schedule did not expand to any date
	#[error("no date in the range matches the selected weekdays")]
	NoMatchingDates,
}

/// Why an admission check refused a reservation
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
	#[error(
		"there are already {0} student reservations approved for this lab and \
		 time slot"
	)]
	StudentQuotaReached(usize),
	#[error(
		"there is an existing reservation of another category approved for \
		 this lab and time slot"
	)]
	OtherCategory,
	#[error("there is already an approved {0} reservation for this lab and time slot")]
	AlreadyHeld(ParticipantRole),
	#[error("the occupancy of this lab and time slot could not be verified")]
	Unverifiable,
}

/// An [`AdmissionError`] for a specific lab, date and time slot
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct AdmissionConflict {
	pub lab_id:       i32,
	pub date:         NaiveDate,
	pub time_slot_id: i32,
	pub reason:       AdmissionError,
}

/// A list of possible internal errors
///
/// API end users should never see these details
#[derive(Debug, Error)]
pub enum InternalServerError {
	/// Error executing some database operation
	#[error("database error -- {0:?}")]
	DatabaseError(diesel::result::Error),
	/// Error interacting with a database connection
	#[error("database interaction error -- {0:?}")]
	DatabaseInteractionError(deadpool_diesel::InteractError),
	/// Error hashing some value
	#[error("hash error -- {0:?}")]
	HashError(argon2::password_hash::Error),
	/// Malformed email
	#[error("invalid email -- {0:?}")]
	InvalidEmail(lettre::address::AddressError),
	/// Mailer stopped unexpectedly
	#[error("mailer stopped -- {0:?}")]
	MailerStopped(mpsc::error::SendError<lettre::Message>),
	/// Mail queue is full
	#[error("mail queue full -- {0:?}")]
	MailQueueFull(mpsc::error::TrySendError<lettre::Message>),
	/// Generic mailer error
	#[error("mail error -- {0:?}")]
	MailError(lettre::error::Error),
	/// Error acquiring database pool connection
	#[error("database pool error -- {0:?}")]
	PoolError(deadpool_diesel::PoolError),
	/// Error executing some redis operation
	#[error("redis error -- {0:?}")]
	RedisError(redis::RedisError),
	/// Error related to `serde_json`
	#[error("serde_json error -- {0:?}")]
	SerdeJsonError(serde_json::Error),
	/// Attempted to extract a session from a request that has not been
	/// authorized
	#[error("attempted to extract session without checking authorization")]
	SessionWithoutAuthError,
	/// Rendering a mail template failed
	#[error("template error -- {0:?}")]
	TemplateError(askama::Error),
}

// Map internal server errors to application errors
impl From<InternalServerError> for Error {
	fn from(value: InternalServerError) -> Self {
		error!("internal server error -- {value}");

		Self::InternalServerError
	}
}

/// Map validation errors to application errors
impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		let errs = err.field_errors();
		let repr = errs
			.values()
			.map(|v| {
				v.iter()
					.map(ToString::to_string)
					.collect::<Vec<String>>()
					.join("\n")
			})
			.collect::<Vec<String>>()
			.join("\n");

		Self::ValidationError(repr)
	}
}

/// Map password hashing errors to application errors
impl From<argon2::password_hash::Error> for Error {
	fn from(err: argon2::password_hash::Error) -> Self {
		match err {
			argon2::password_hash::Error::Password => {
				LoginError::InvalidPassword.into()
			},
			_ => InternalServerError::HashError(err).into(),
		}
	}
}

/// Map database interaction errors to application errors
impl From<deadpool_diesel::InteractError> for Error {
	fn from(value: deadpool_diesel::InteractError) -> Self {
		InternalServerError::DatabaseInteractionError(value).into()
	}
}

/// Map of constraint names to column names.
static CONSTRAINT_TO_COLUMN: LazyLock<HashMap<&str, &str>> =
	LazyLock::new(|| {
		HashMap::from([
			("lab_name_key", "lab name"),
			("time_slot_label_key", "time slot label"),
		])
	});

/// Map database result errors to application errors.
impl From<diesel::result::Error> for Error {
	fn from(err: diesel::result::Error) -> Self {
		match &err {
			// No rows returned by query that expected at least one
			diesel::result::Error::NotFound => {
				Self::NotFound("no context provided".to_string())
			},
			// Unique constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::UniqueViolation,
				info,
			) => {
				let field = info
					.constraint_name()
					.and_then(|name| CONSTRAINT_TO_COLUMN.get(name));

				match field {
					Some(field) => {
						Self::Duplicate(format!("{field} is already in use"))
					},
					None => InternalServerError::DatabaseError(err).into(),
				}
			},
			// Foreign key or check constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::ForeignKeyViolation
				| DatabaseErrorKind::CheckViolation,
				info,
			) => Self::ValidationError(info.message().to_string()),
			_ => InternalServerError::DatabaseError(err).into(),
		}
	}
}

impl From<deadpool_diesel::PoolError> for Error {
	fn from(value: deadpool_diesel::PoolError) -> Self {
		InternalServerError::PoolError(value).into()
	}
}

impl From<lettre::address::AddressError> for Error {
	fn from(err: lettre::address::AddressError) -> Self {
		InternalServerError::InvalidEmail(err).into()
	}
}

impl From<mpsc::error::SendError<lettre::Message>> for Error {
	fn from(err: mpsc::error::SendError<lettre::Message>) -> Self {
		InternalServerError::MailerStopped(err).into()
	}
}

impl From<mpsc::error::TrySendError<lettre::Message>> for Error {
	fn from(err: mpsc::error::TrySendError<lettre::Message>) -> Self {
		InternalServerError::MailQueueFull(err).into()
	}
}

impl From<lettre::error::Error> for Error {
	fn from(err: lettre::error::Error) -> Self {
		InternalServerError::MailError(err).into()
	}
}

impl From<redis::RedisError> for Error {
	fn from(err: redis::RedisError) -> Self {
		InternalServerError::RedisError(err).into()
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		InternalServerError::SerdeJsonError(err).into()
	}
}

impl From<askama::Error> for Error {
	fn from(err: askama::Error) -> Self {
		InternalServerError::TemplateError(err).into()
	}
}

use db::{ParticipantRole, participant};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A person linked to one or more reservations
#[derive(
	Clone,
	Debug,
	Deserialize,
	Identifiable,
	PartialEq,
	Eq,
	Queryable,
	Selectable,
	Serialize,
)]
#[diesel(table_name = participant)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Participant {
	pub id:             i32,
	pub name:           String,
	pub account_number: String,
	pub email:          Option<String>,
	pub role:           ParticipantRole,
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = participant)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct NewParticipant {
	pub name:           String,
	pub account_number: String,
	pub email:          Option<String>,
	pub role:           ParticipantRole,
}

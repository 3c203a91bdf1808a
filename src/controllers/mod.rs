//! Defines controller functions that correspond to individual routes

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{DbPool, Error};
use diesel::{RunQueryDsl, sql_query};
use serde_json::{Value, json};

pub mod auth;
pub mod calendar;
pub mod incident;
pub mod lab;
pub mod mail;
pub mod quarter;
pub mod reservation;
pub mod statistics;
pub mod time_slot;
pub mod usage;

/// Check if the database connection and webserver are functional
pub(crate) async fn healthcheck(
	State(pool): State<DbPool>,
) -> Result<(StatusCode, Json<Value>), Error> {
	let conn = pool.get().await?;

	conn.interact(|conn| sql_query("SELECT 1").execute(conn)).await??;

	Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}

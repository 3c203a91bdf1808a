use chrono::NaiveDate;
use common::{DbConn, Error};
use db::{QuarterId, quarter};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::upsert::excluded;
use serde::{Deserialize, Serialize};

/// One of the four configured academic quarters used as usage windows
#[derive(
	Clone,
	Copy,
	Debug,
	Deserialize,
	Insertable,
	PartialEq,
	Eq,
	Queryable,
	Selectable,
	Serialize,
)]
#[diesel(table_name = quarter)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Quarter {
	pub id:        QuarterId,
	pub starts_on: NaiveDate,
	pub ends_on:   NaiveDate,
}

impl Quarter {
	/// Get all configured [`Quarter`]s in order
	#[instrument(skip(conn))]
	pub async fn get_all(conn: &DbConn) -> Result<Vec<Self>, Error> {
		let quarters = conn
			.interact(|conn| {
				use self::quarter::dsl::*;

				quarter.order(id.asc()).select(Self::as_select()).get_results(conn)
			})
			.await??;

		Ok(quarters)
	}

	/// Get a single [`Quarter`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(q_id: QuarterId, conn: &DbConn) -> Result<Self, Error> {
		let found = conn
			.interact(move |conn| {
				use self::quarter::dsl::*;

				quarter
					.find(q_id)
					.select(Self::as_select())
					.get_result(conn)
					.optional()
			})
			.await??;

		found.ok_or_else(|| {
			Error::NotFound(format!("quarter {q_id:?} is not configured"))
		})
	}

	/// Insert this [`Quarter`] or replace the existing bounds
	#[instrument(skip(conn))]
	pub async fn upsert(self, conn: &DbConn) -> Result<Self, Error> {
		let stored = conn
			.interact(move |conn| {
				use self::quarter::dsl::*;

				diesel::insert_into(quarter)
					.values(self)
					.on_conflict(id)
					.do_update()
					.set((
						starts_on.eq(excluded(starts_on)),
						ends_on.eq(excluded(ends_on)),
					))
					.returning(Self::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("stored quarter {stored:?}");

		Ok(stored)
	}
}

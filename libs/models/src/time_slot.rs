use common::{DbConn, Error};
use db::time_slot;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

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
#[diesel(table_name = time_slot)]
#[diesel(check_for_backend(Pg))]
pub struct TimeSlot {
	pub id:    i32,
	pub label: String,
}

impl TimeSlot {
	/// Get all [`TimeSlot`]s in creation order
	#[instrument(skip(conn))]
	pub async fn get_all(conn: &DbConn) -> Result<Vec<Self>, Error> {
		let slots = conn
			.interact(|conn| {
				use self::time_slot::dsl::*;

				time_slot.order(id.asc()).select(Self::as_select()).get_results(conn)
			})
			.await??;

		Ok(slots)
	}

	/// Get every [`TimeSlot`] in a list of ids, failing if any is unknown
	#[instrument(skip(conn))]
	pub async fn get_by_ids(
		t_ids: Vec<i32>,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let wanted = t_ids.clone();

		let slots: Vec<Self> = conn
			.interact(move |conn| {
				use self::time_slot::dsl::*;

				time_slot
					.filter(id.eq_any(wanted))
					.order(id.asc())
					.select(Self::as_select())
					.get_results(conn)
			})
			.await??;

		if let Some(missing) =
			t_ids.iter().find(|t| !slots.iter().any(|s| s.id == **t))
		{
			return Err(Error::NotFound(format!("time slot with id {missing}")));
		}

		Ok(slots)
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = time_slot)]
#[diesel(check_for_backend(Pg))]
pub struct NewTimeSlot {
	pub label: String,
}

impl NewTimeSlot {
	/// Insert this [`NewTimeSlot`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<TimeSlot, Error> {
		let slot = conn
			.interact(|conn| {
				use self::time_slot::dsl::*;

				diesel::insert_into(time_slot)
					.values(self)
					.returning(TimeSlot::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created time slot {slot:?}");

		Ok(slot)
	}
}

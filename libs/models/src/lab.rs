use common::{DbConn, Error};
use db::lab;
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
#[diesel(table_name = lab)]
#[diesel(check_for_backend(Pg))]
pub struct Lab {
	pub id:   i32,
	pub name: String,
}

impl Lab {
	/// Get all [`Lab`]s ordered by name
	#[instrument(skip(conn))]
	pub async fn get_all(conn: &DbConn) -> Result<Vec<Self>, Error> {
		let labs = conn
			.interact(|conn| {
				use self::lab::dsl::*;

				lab.order(name.asc()).select(Self::as_select()).get_results(conn)
			})
			.await??;

		Ok(labs)
	}

	/// Get a [`Lab`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(l_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let found = conn
			.interact(move |conn| {
				use self::lab::dsl::*;

				lab.find(l_id)
					.select(Self::as_select())
					.get_result(conn)
					.optional()
			})
			.await??;

		found.ok_or_else(|| Error::NotFound(format!("lab with id {l_id}")))
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = lab)]
#[diesel(check_for_backend(Pg))]
pub struct NewLab {
	pub name: String,
}

impl NewLab {
	/// Insert this [`NewLab`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Lab, Error> {
		let new_lab = conn
			.interact(|conn| {
				use self::lab::dsl::*;

				diesel::insert_into(lab)
					.values(self)
					.returning(Lab::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created lab {new_lab:?}");

		Ok(new_lab)
	}
}

use std::collections::HashMap;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{incident, lab};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use serde::{Deserialize, Serialize};

use crate::{BoxedCondition, Lab};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = incident)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveIncident {
	pub id:             i32,
	pub lab_id:         i32,
	pub description:    String,
	pub reporter_email: String,
	pub occurred_at:    NaiveDateTime,
	pub report_url:     Option<String>,
}

/// An incident together with the lab it happened in
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
	pub incident: PrimitiveIncident,
	pub lab:      Lab,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentFilter {
	pub search: Option<String>,
}

impl IncidentFilter {
	fn pattern(&self) -> Option<String> {
		self.search
			.as_deref()
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(|s| format!("%{s}%"))
	}

	/// Build the incident condition, `lab_ids` being the labs whose name
	/// matched the search term
	fn to_condition(
		&self,
		lab_ids: Vec<i32>,
	) -> BoxedCondition<incident::table> {
		let Some(pattern) = self.pattern() else {
			return Box::new(true.into_sql::<Bool>());
		};

		Box::new(
			incident::lab_id
				.eq_any(lab_ids)
				.or(incident::description.ilike(pattern.clone()))
				.or(incident::reporter_email.ilike(pattern)),
		)
	}
}

impl Incident {
	/// Search incidents newest first, returning the total match count and the
	/// requested page
	#[instrument(skip(conn))]
	pub async fn search(
		filter: IncidentFilter,
		limit: i64,
		offset: i64,
		conn: &DbConn,
	) -> Result<(i64, Vec<Self>), Error> {
		let (total, rows, labs) = conn
			.interact(move |conn| {
				let matching_labs: Vec<i32> = match filter.pattern() {
					Some(pattern) => {
						lab::table
							.filter(lab::name.ilike(pattern))
							.select(lab::id)
							.get_results(conn)?
					},
					None => vec![],
				};

				let total: i64 = incident::table
					.filter(filter.to_condition(matching_labs.clone()))
					.count()
					.get_result(conn)?;

				let rows: Vec<PrimitiveIncident> = incident::table
					.filter(filter.to_condition(matching_labs))
					.order((incident::occurred_at.desc(), incident::id.desc()))
					.limit(limit)
					.offset(offset)
					.select(PrimitiveIncident::as_select())
					.get_results(conn)?;

				let lab_ids: Vec<i32> = rows.iter().map(|i| i.lab_id).collect();

				let labs: Vec<Lab> = lab::table
					.filter(lab::id.eq_any(lab_ids))
					.select(Lab::as_select())
					.get_results(conn)?;

				Ok::<_, diesel::result::Error>((total, rows, labs))
			})
			.await??;

		let labs: HashMap<i32, Lab> =
			labs.into_iter().map(|l| (l.id, l)).collect();

		let incidents = rows
			.into_iter()
			.filter_map(|incident| {
				let lab = labs.get(&incident.lab_id).cloned()?;

				Some(Self { incident, lab })
			})
			.collect();

		Ok((total, incidents))
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = incident)]
#[diesel(check_for_backend(Pg))]
pub struct NewIncident {
	pub lab_id:         i32,
	pub description:    String,
	pub reporter_email: String,
	pub occurred_at:    Option<NaiveDateTime>,
	pub report_url:     Option<String>,
}

impl NewIncident {
	/// Insert this [`NewIncident`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Incident, Error> {
		let lab = Lab::get_by_id(self.lab_id, conn).await?;

		let incident = conn
			.interact(|conn| {
				diesel::insert_into(incident::table)
					.values(self)
					.returning(PrimitiveIncident::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("reported incident {incident:?}");

		Ok(Incident { incident, lab })
	}
}

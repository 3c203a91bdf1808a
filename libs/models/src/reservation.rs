use chrono::{NaiveDate, NaiveDateTime};
use common::{DbConn, Error};
use db::{
	ParticipantRole,
	ReservationState,
	lab,
	participant,
	reservation,
	reservation_participant,
	reservation_time_slot,
	time_slot,
};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Lab, NewParticipant, Participant, TimeSlot};

/// A single reservation row, one per booked date
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
#[diesel(table_name = reservation)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveReservation {
	pub id:          i32,
	pub group_id:    Option<Uuid>,
	pub lab_id:      i32,
	pub date:        NaiveDate,
	pub purpose:     String,
	pub headcount:   i32,
	pub repeat_days: Vec<String>,
	pub state:       ReservationState,
	pub created_at:  NaiveDateTime,
}

#[derive(
	Associations,
	Clone,
	Copy,
	Debug,
	Identifiable,
	Insertable,
	Queryable,
	Selectable,
)]
#[diesel(belongs_to(PrimitiveReservation, foreign_key = reservation_id))]
#[diesel(table_name = reservation_time_slot)]
#[diesel(primary_key(reservation_id, time_slot_id))]
#[diesel(check_for_backend(Pg))]
pub struct ReservationTimeSlot {
	pub reservation_id: i32,
	pub time_slot_id:   i32,
}

#[derive(
	Associations,
	Clone,
	Copy,
	Debug,
	Identifiable,
	Insertable,
	Queryable,
	Selectable,
)]
#[diesel(belongs_to(PrimitiveReservation, foreign_key = reservation_id))]
#[diesel(table_name = reservation_participant)]
#[diesel(primary_key(reservation_id, participant_id))]
#[diesel(check_for_backend(Pg))]
pub struct ReservationParticipant {
	pub reservation_id: i32,
	pub participant_id: i32,
	pub is_requester:   bool,
}

/// A participant as linked to a specific reservation
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedParticipant {
	#[serde(flatten)]
	pub participant:  Participant,
	pub is_requester: bool,
}

/// A reservation row with its lab, time slots and participants
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
	pub reservation:  PrimitiveReservation,
	pub lab:          Lab,
	pub time_slots:   Vec<TimeSlot>,
	pub participants: Vec<LinkedParticipant>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFilter {
	pub state:  Option<ReservationState>,
	pub lab_id: Option<i32>,
	/// Role of the requesting participant
	pub role:   Option<ParticipantRole>,
	/// Email of any linked participant
	pub email:  Option<String>,
	pub from:   Option<NaiveDate>,
	pub until:  Option<NaiveDate>,
}

impl Reservation {
	/// The participant that made this reservation
	#[must_use]
	pub fn requester(&self) -> Option<&Participant> {
		self.participants
			.iter()
			.find(|p| p.is_requester)
			.map(|p| &p.participant)
	}

	/// Load the time slots and participants of a set of joined rows
	fn attach_relations(
		rows: Vec<(PrimitiveReservation, Lab)>,
		conn: &mut PgConnection,
	) -> QueryResult<Vec<Self>> {
		let (reservations, labs): (Vec<_>, Vec<_>) = rows.into_iter().unzip();

		let slots: Vec<(ReservationTimeSlot, TimeSlot)> =
			ReservationTimeSlot::belonging_to(&reservations)
				.inner_join(time_slot::table)
				.order(time_slot::id.asc())
				.select((
					ReservationTimeSlot::as_select(),
					TimeSlot::as_select(),
				))
				.get_results(conn)?;

		let participants: Vec<(ReservationParticipant, Participant)> =
			ReservationParticipant::belonging_to(&reservations)
				.inner_join(participant::table)
				.order(participant::id.asc())
				.select((
					ReservationParticipant::as_select(),
					Participant::as_select(),
				))
				.get_results(conn)?;

		let slots = slots.grouped_by(&reservations);
		let participants = participants.grouped_by(&reservations);

		let joined = reservations
			.into_iter()
			.zip(labs)
			.zip(slots)
			.zip(participants)
			.map(|(((reservation, lab), slots), participants)| {
				Self {
					reservation,
					lab,
					time_slots: slots.into_iter().map(|(_, s)| s).collect(),
					participants: participants
						.into_iter()
						.map(|(link, participant)| {
							LinkedParticipant {
								participant,
								is_requester: link.is_requester,
							}
						})
						.collect(),
				}
			})
			.collect();

		Ok(joined)
	}

	/// Get every [`Reservation`] in a list of ids, ordered by id
	#[instrument(skip(conn))]
	pub async fn get_by_ids(
		r_ids: Vec<i32>,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let reservations = conn
			.interact(move |conn| {
				let rows = reservation::table
					.inner_join(lab::table)
					.filter(reservation::id.eq_any(r_ids))
					.order(reservation::id.asc())
					.select((PrimitiveReservation::as_select(), Lab::as_select()))
					.get_results(conn)?;

				Self::attach_relations(rows, conn)
			})
			.await??;

		Ok(reservations)
	}

	/// List all reservations matching a [`ReservationFilter`], newest first
	#[instrument(skip(conn))]
	pub async fn list(
		filter: ReservationFilter,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let reservations = conn
			.interact(move |conn| {
				let mut query = reservation::table
					.inner_join(lab::table)
					.order(reservation::id.desc())
					.select((PrimitiveReservation::as_select(), Lab::as_select()))
					.into_boxed();

				if let Some(state) = filter.state {
					query = query.filter(reservation::state.eq(state));
				}

				if let Some(l_id) = filter.lab_id {
					query = query.filter(reservation::lab_id.eq(l_id));
				}

				if let Some(from) = filter.from {
					query = query.filter(reservation::date.ge(from));
				}

				if let Some(until) = filter.until {
					query = query.filter(reservation::date.le(until));
				}

				if let Some(email) = filter.email {
					let r_ids: Vec<i32> = reservation_participant::table
						.inner_join(participant::table)
						.filter(participant::email.eq(email))
						.select(reservation_participant::reservation_id)
						.get_results(conn)?;

					query = query.filter(reservation::id.eq_any(r_ids));
				}

				if let Some(role) = filter.role {
					let r_ids: Vec<i32> = reservation_participant::table
						.inner_join(participant::table)
						.filter(reservation_participant::is_requester.eq(true))
						.filter(participant::role.eq(role))
						.select(reservation_participant::reservation_id)
						.get_results(conn)?;

					query = query.filter(reservation::id.eq_any(r_ids));
				}

				let rows = query.get_results(conn)?;

				Self::attach_relations(rows, conn)
			})
			.await??;

		Ok(reservations)
	}

	/// Get the requester roles of every reservation approved for an exact
	/// lab, date and time slot
	#[instrument(skip(conn))]
	pub async fn approved_requester_roles(
		l_id: i32,
		on: NaiveDate,
		t_id: i32,
		conn: &DbConn,
	) -> Result<Vec<ParticipantRole>, Error> {
		let roles = conn
			.interact(move |conn| {
				reservation::table
					.inner_join(reservation_time_slot::table)
					.inner_join(
						reservation_participant::table
							.inner_join(participant::table),
					)
					.filter(reservation::lab_id.eq(l_id))
					.filter(reservation::date.eq(on))
					.filter(reservation::state.eq(ReservationState::Approved))
					.filter(reservation_time_slot::time_slot_id.eq(t_id))
					.filter(reservation_participant::is_requester.eq(true))
					.select(participant::role)
					.get_results(conn)
			})
			.await??;

		Ok(roles)
	}

	/// Get the distinct `(lab_id, time_slot_id)` pairs booked by approved
	/// reservations within a date window
	#[instrument(skip(conn))]
	pub async fn approved_slot_pairs(
		l_id: Option<i32>,
		from: NaiveDate,
		until: NaiveDate,
		conn: &DbConn,
	) -> Result<Vec<(i32, i32)>, Error> {
		let pairs = conn
			.interact(move |conn| {
				let mut query = reservation_time_slot::table
					.inner_join(reservation::table)
					.filter(reservation::state.eq(ReservationState::Approved))
					.filter(reservation::date.between(from, until))
					.select((
						reservation::lab_id,
						reservation_time_slot::time_slot_id,
					))
					.distinct()
					.into_boxed();

				if let Some(l_id) = l_id {
					query = query.filter(reservation::lab_id.eq(l_id));
				}

				query.get_results(conn)
			})
			.await??;

		Ok(pairs)
	}

	/// Count the approved reservations of every lab that has any
	#[instrument(skip(conn))]
	pub async fn approved_counts_per_lab(
		conn: &DbConn,
	) -> Result<Vec<(Lab, i64)>, Error> {
		let counts = conn
			.interact(|conn| {
				lab::table
					.inner_join(reservation::table)
					.filter(reservation::state.eq(ReservationState::Approved))
					.group_by((lab::id, lab::name))
					.order(lab::name.asc())
					.select((
						Lab::as_select(),
						diesel::dsl::count(reservation::id),
					))
					.get_results(conn)
			})
			.await??;

		Ok(counts)
	}

	/// Move every reservation in a list of ids to a new state
	#[instrument(skip(conn))]
	pub async fn set_state(
		r_ids: Vec<i32>,
		new_state: ReservationState,
		conn: &DbConn,
	) -> Result<usize, Error> {
		let updated = conn
			.interact(move |conn| {
				diesel::update(
					reservation::table.filter(reservation::id.eq_any(r_ids)),
				)
				.set(reservation::state.eq(new_state))
				.execute(conn)
			})
			.await??;

		info!("set {updated} reservations to {new_state:?}");

		Ok(updated)
	}
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = reservation)]
#[diesel(check_for_backend(Pg))]
struct NewReservation {
	group_id:    Option<Uuid>,
	lab_id:      i32,
	date:        NaiveDate,
	purpose:     String,
	headcount:   i32,
	repeat_days: Vec<String>,
}

/// Everything needed to write a booking request, one row per date
#[derive(Clone, Debug)]
pub struct NewBooking {
	pub group_id:      Option<Uuid>,
	pub lab_id:        i32,
	pub dates:         Vec<NaiveDate>,
	pub time_slot_ids: Vec<i32>,
	pub purpose:       String,
	pub repeat_days:   Vec<String>,
	pub requester:     NewParticipant,
	pub members:       Vec<NewParticipant>,
}

impl NewBooking {
	/// Write every row, slot link and participant link of this booking in a
	/// single transaction
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Vec<Reservation>, Error> {
		let r_ids = conn
			.interact(move |conn| {
				conn.transaction::<_, diesel::result::Error, _>(|conn| {
					let requester_id: i32 =
						diesel::insert_into(participant::table)
							.values(&self.requester)
							.returning(participant::id)
							.get_result(conn)?;

					let member_ids: Vec<i32> = if self.members.is_empty() {
						vec![]
					} else {
						diesel::insert_into(participant::table)
							.values(&self.members)
							.returning(participant::id)
							.get_results(conn)?
					};

					#[allow(clippy::cast_possible_truncation)]
					#[allow(clippy::cast_possible_wrap)]
					let headcount = member_ids.len() as i32 + 1;

					let mut r_ids = Vec::with_capacity(self.dates.len());

					for date in &self.dates {
						let new_reservation = NewReservation {
							group_id: self.group_id,
							lab_id: self.lab_id,
							date: *date,
							purpose: self.purpose.clone(),
							headcount,
							repeat_days: self.repeat_days.clone(),
						};

						let r_id: i32 = diesel::insert_into(reservation::table)
							.values(&new_reservation)
							.returning(reservation::id)
							.get_result(conn)?;

						let slot_links: Vec<ReservationTimeSlot> = self
							.time_slot_ids
							.iter()
							.map(|&time_slot_id| {
								ReservationTimeSlot {
									reservation_id: r_id,
									time_slot_id,
								}
							})
							.collect();

						diesel::insert_into(reservation_time_slot::table)
							.values(&slot_links)
							.execute(conn)?;

						let participant_links: Vec<ReservationParticipant> =
							std::iter::once((requester_id, true))
								.chain(member_ids.iter().map(|&m| (m, false)))
								.map(|(participant_id, is_requester)| {
									ReservationParticipant {
										reservation_id: r_id,
										participant_id,
										is_requester,
									}
								})
								.collect();

						diesel::insert_into(reservation_participant::table)
							.values(&participant_links)
							.execute(conn)?;

						r_ids.push(r_id);
					}

					Ok(r_ids)
				})
			})
			.await??;

		let reservations = Reservation::get_by_ids(r_ids, conn).await?;

		info!("created {} reservations", reservations.len());

		Ok(reservations)
	}
}

use std::collections::HashSet;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use booking::admission::{self, SlotKey};
use booking::grouping::group_reservations;
use common::{DbPool, Error};
use db::ReservationState;
use models::{
	Lab,
	NewBooking,
	NewParticipant,
	Reservation,
	ReservationFilter,
	TimeSlot,
};
use validator::Validate;

use crate::Config;
use crate::mailer::Mailer;
use crate::schemas::reservation::{
	AdmissionQuery,
	AdmissionResponse,
	CreateReservationRequest,
	MyReservationsQuery,
	UpdateStateRequest,
};
use crate::session::{AdminSession, Session};

/// Every (lab, date, slot) touched by a reservation row
fn slot_keys(row: &Reservation) -> Vec<SlotKey> {
	row.time_slots
		.iter()
		.map(|slot| {
			SlotKey {
				lab_id:       row.reservation.lab_id,
				date:         row.reservation.date,
				time_slot_id: slot.id,
			}
		})
		.collect()
}

#[instrument(skip(config, pool))]
pub(crate) async fn create_reservation(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	session: Session,
	Json(request): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let time_slot_ids = request.time_slots_for_role()?;
	let expansion = request.schedule.expand_for(request.role)?;

	let conn = pool.get().await?;

	let lab_id = Lab::get_by_id(request.lab_id, &conn).await?.id;
	TimeSlot::get_by_ids(time_slot_ids.clone(), &conn).await?;

	let keys: Vec<SlotKey> = expansion
		.dates
		.iter()
		.flat_map(|&date| {
			time_slot_ids.iter().map(move |&time_slot_id| {
				SlotKey { lab_id, date, time_slot_id }
			})
		})
		.collect();

	admission::check_all(
		keys,
		request.role,
		config.admission_failure_policy,
		&conn,
	)
	.await?;

	let requester = NewParticipant {
		name:           request.name,
		account_number: request.account_number,
		email:          Some(session.data.email.clone()),
		role:           request.role,
	};

	let booking = NewBooking {
		group_id: expansion.group_id,
		lab_id,
		dates: expansion.dates,
		time_slot_ids,
		purpose: request.purpose,
		repeat_days: expansion.repeat_days,
		requester,
		members: request.members.into_iter().map(Into::into).collect(),
	};

	let rows = booking.insert(&conn).await?;

	info!(
		"{} booked lab {} on {} date(s)",
		session.data.email,
		lab_id,
		rows.len()
	);

	Ok((StatusCode::CREATED, Json(group_reservations(rows))))
}

#[instrument(skip(pool))]
pub(crate) async fn get_my_reservations(
	State(pool): State<DbPool>,
	session: Session,
	Query(query): Query<MyReservationsQuery>,
) -> Result<impl IntoResponse, Error> {
	let filter = ReservationFilter {
		state: query.state,
		email: Some(session.data.email),
		..ReservationFilter::default()
	};

	let conn = pool.get().await?;
	let rows = Reservation::list(filter, &conn).await?;

	Ok((StatusCode::OK, Json(group_reservations(rows))))
}

/// Preview the admission decision for a single slot without booking it
#[instrument(skip(config, pool))]
pub(crate) async fn check_admission(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	Query(query): Query<AdmissionQuery>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let key = SlotKey {
		lab_id:       query.lab_id,
		date:         query.date,
		time_slot_id: query.time_slot_id,
	};

	let preview = admission::check_preview(
		key,
		query.role,
		config.admission_failure_policy,
		&conn,
	)
	.await;

	let response = AdmissionResponse {
		allowed: preview.decision.is_ok(),
		tally:   preview.tally,
		reason:  preview.decision.err().map(|e| e.to_string()),
	};

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_reservations(
	State(pool): State<DbPool>,
	Query(filter): Query<ReservationFilter>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;
	let rows = Reservation::list(filter, &conn).await?;

	Ok((StatusCode::OK, Json(group_reservations(rows))))
}

/// Move a set of reservation rows, usually one group, to a new state
///
/// Approving runs the admission checks for every row that is not approved
/// yet unless `force` is set. Rows of the same request count against each
/// other. The requester and the operations mailbox are notified for every
/// newly approved group
#[instrument(skip(config, pool, mailer))]
pub(crate) async fn update_reservation_state(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	State(mailer): State<Mailer>,
	session: AdminSession,
	Json(request): Json<UpdateStateRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let ids: HashSet<i32> = request.ids.iter().copied().collect();

	let conn = pool.get().await?;
	let rows = Reservation::get_by_ids(request.ids.clone(), &conn).await?;

	if let Some(missing) =
		ids.iter().find(|id| !rows.iter().any(|r| r.reservation.id == **id))
	{
		return Err(Error::NotFound(format!("reservation with id {missing}")));
	}

	let newly_approved: HashSet<i32> = if request.state
		== ReservationState::Approved
	{
		rows.iter()
			.filter(|r| r.reservation.state != ReservationState::Approved)
			.map(|r| r.reservation.id)
			.collect()
	} else {
		HashSet::new()
	};

	if !request.force {
		let mut requests = vec![];

		for row in
			rows.iter().filter(|r| newly_approved.contains(&r.reservation.id))
		{
			let Some(requester) = row.requester() else {
				return Err(Error::ValidationError(format!(
					"reservation {} has no requester and cannot be checked",
					row.reservation.id
				)));
			};

			let role = requester.role;
			requests.extend(slot_keys(row).into_iter().map(|k| (k, role)));
		}

		admission::check_batch(
			requests,
			config.admission_failure_policy,
			&conn,
		)
		.await?;
	} else if !newly_approved.is_empty() {
		warn!(
			"{} force approving reservations {newly_approved:?}",
			session.data.email
		);
	}

	Reservation::set_state(ids.into_iter().collect(), request.state, &conn)
		.await?;

	info!(
		"{} moved reservations {:?} to {:?}",
		session.data.email, request.ids, request.state
	);

	let rows = Reservation::get_by_ids(request.ids, &conn).await?;
	let groups = group_reservations(rows);

	for group in groups
		.iter()
		.filter(|g| g.ids.iter().any(|id| newly_approved.contains(id)))
	{
		mailer.send_reservation_approved(group).await;
	}

	Ok((StatusCode::OK, Json(groups)))
}

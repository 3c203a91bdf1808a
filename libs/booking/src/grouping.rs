use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use db::ReservationState;
use models::{Lab, LinkedParticipant, Participant, PrimitiveReservation, Reservation};
use serde::Serialize;
use uuid::Uuid;

/// What a set of per-date rows is grouped by
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
	Group(Uuid),
	Single(i32),
}

impl GroupKey {
	#[must_use]
	pub fn of(reservation: &PrimitiveReservation) -> Self {
		reservation.group_id.map_or(Self::Single(reservation.id), Self::Group)
	}
}

/// Per-date reservation rows collapsed into a single display entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationGroup {
	pub key:          GroupKey,
	pub ids:          Vec<i32>,
	pub lab:          Lab,
	pub purpose:      String,
	pub headcount:    i32,
	pub repeat_days:  Vec<String>,
	pub state:        ReservationState,
	pub created_at:   NaiveDateTime,
	pub dates:        Vec<NaiveDate>,
	pub time_slots:   Vec<String>,
	pub slot_summary: String,
	pub participants: Vec<LinkedParticipant>,
}

impl ReservationGroup {
	fn merge(key: GroupKey, mut rows: Vec<Reservation>) -> Option<Self> {
		rows.sort_by_key(|r| r.reservation.id);

		let first = rows.first()?;
		let lab = first.lab.clone();
		let purpose = first.reservation.purpose.clone();
		let headcount = first.reservation.headcount;
		let repeat_days = first.reservation.repeat_days.clone();
		let state = first.reservation.state;
		let created_at = first.reservation.created_at;

		let mut ids = BTreeSet::new();
		let mut dates = BTreeSet::new();
		let mut labels = BTreeSet::new();
		let mut participants: BTreeMap<i32, LinkedParticipant> = BTreeMap::new();

		for row in rows {
			ids.insert(row.reservation.id);
			dates.insert(row.reservation.date);
			labels.extend(row.time_slots.into_iter().map(|s| s.label));

			for linked in row.participants {
				participants
					.entry(linked.participant.id)
					.and_modify(|p| p.is_requester |= linked.is_requester)
					.or_insert(linked);
			}
		}

		let time_slots: Vec<String> = labels.into_iter().collect();
		let slot_summary = time_slots.join(", ");

		Some(Self {
			key,
			ids: ids.into_iter().collect(),
			lab,
			purpose,
			headcount,
			repeat_days,
			state,
			created_at,
			dates: dates.into_iter().collect(),
			time_slots,
			slot_summary,
			participants: participants.into_values().collect(),
		})
	}

	/// The participant that made this booking
	#[must_use]
	pub fn requester(&self) -> Option<&Participant> {
		self.participants
			.iter()
			.find(|p| p.is_requester)
			.map(|p| &p.participant)
	}

	#[must_use]
	pub fn latest_date(&self) -> Option<NaiveDate> { self.dates.last().copied() }
}

/// Collapse reservation rows into groups, most recent date first
///
/// The result does not depend on the order of `rows`
#[must_use]
pub fn group_reservations(rows: Vec<Reservation>) -> Vec<ReservationGroup> {
	let mut buckets: BTreeMap<GroupKey, Vec<Reservation>> = BTreeMap::new();

	for row in rows {
		buckets.entry(GroupKey::of(&row.reservation)).or_default().push(row);
	}

	let mut groups: Vec<ReservationGroup> = buckets
		.into_iter()
		.filter_map(|(key, rows)| ReservationGroup::merge(key, rows))
		.collect();

	groups.sort_by(|a, b| {
		b.latest_date()
			.cmp(&a.latest_date())
			.then_with(|| a.key.cmp(&b.key))
	});

	groups
}

use booking::slot::SlotSpan;
use chrono::{NaiveDate, NaiveDateTime};
use models::Reservation;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
	pub lab_id: Option<i32>,
	pub from:   Option<NaiveDate>,
	pub until:  Option<NaiveDate>,
}

/// A single approved reservation in a single time slot
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
	pub reservation_id: i32,
	pub group_id:       Option<Uuid>,
	pub lab_id:         i32,
	pub lab_name:       String,
	pub title:          String,
	pub time_slot:      String,
	pub start:          NaiveDateTime,
	pub end:            NaiveDateTime,
}

impl CalendarEvent {
	/// Expand approved reservation rows into one event per time slot, ordered
	/// by start
	///
	/// Slots whose label cannot be read as a time range are skipped
	#[must_use]
	pub fn from_reservations(rows: &[Reservation]) -> Vec<Self> {
		let mut events: Vec<Self> = rows
			.iter()
			.flat_map(|row| {
				row.time_slots.iter().filter_map(move |slot| {
					let Some(span) = SlotSpan::parse(&slot.label) else {
						warn!("time slot {} has unreadable label {}", slot.id, slot.label);

						return None;
					};

					let (start, end) = span.on(row.reservation.date);

					Some(Self {
						reservation_id: row.reservation.id,
						group_id: row.reservation.group_id,
						lab_id: row.lab.id,
						lab_name: row.lab.name.clone(),
						title: row.reservation.purpose.clone(),
						time_slot: slot.label.clone(),
						start,
						end,
					})
				})
			})
			.collect();

		events.sort_by(|a, b| {
			a.start.cmp(&b.start).then(a.reservation_id.cmp(&b.reservation_id))
		});

		events
	}
}

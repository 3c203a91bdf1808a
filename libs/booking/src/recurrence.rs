use chrono::{Datelike, NaiveDate, Weekday};
use common::CreateReservationError;
use db::ParticipantRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest repeat range, in days, a single request may span
pub const MAX_RANGE_DAYS: i64 = 366;

/// When a booking takes place, either once or on a set of weekdays
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Schedule {
	Single { date: NaiveDate },
	Repeating { start: NaiveDate, end: NaiveDate, days: Vec<Weekday> },
}

/// The concrete rows a [`Schedule`] turns into
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expansion {
	pub dates:       Vec<NaiveDate>,
	pub group_id:    Option<Uuid>,
	pub repeat_days: Vec<String>,
}

impl Schedule {
	/// Every date this schedule covers, ascending
	///
	/// # Errors
	/// Fails if a repeating range is invalid or matches no date
	pub fn dates(&self) -> Result<Vec<NaiveDate>, CreateReservationError> {
		match self {
			Self::Single { date } => Ok(vec![*date]),
			Self::Repeating { start, end, days } => {
				expand_range(*start, *end, days)
			},
		}
	}

	/// The selected weekdays, Monday first, as stored alongside each row
	#[must_use]
	pub fn repeat_days(&self) -> Vec<String> {
		match self {
			Self::Single { .. } => vec![],
			Self::Repeating { days, .. } => {
				let mut days = days.clone();
				days.sort_by_key(Weekday::num_days_from_monday);
				days.dedup();

				days.iter().map(ToString::to_string).collect()
			},
		}
	}

	/// Expand this schedule for a requester of the given role
	///
	/// # Errors
	/// Students may only book a single date, otherwise see [`Self::dates`]
	pub fn expand_for(
		&self,
		requester: ParticipantRole,
	) -> Result<Expansion, CreateReservationError> {
		if requester.is_student() && matches!(self, Self::Repeating { .. }) {
			return Err(CreateReservationError::RepeatNotAllowed);
		}

		let dates = self.dates()?;
		let group_id = group_id_for(&dates, requester);

		Ok(Expansion { dates, group_id, repeat_days: self.repeat_days() })
	}
}

/// Every date from `start` to `end` inclusive whose weekday is in `days`
///
/// # Errors
/// Fails if the range is reversed, too long, has no weekday selected or
/// matches no date
pub fn expand_range(
	start: NaiveDate,
	end: NaiveDate,
	days: &[Weekday],
) -> Result<Vec<NaiveDate>, CreateReservationError> {
	if start > end {
		return Err(CreateReservationError::InvalidRange { start, end });
	}

	if days.is_empty() {
		return Err(CreateReservationError::NoRepeatDays);
	}

	if (end - start).num_days() + 1 > MAX_RANGE_DAYS {
		return Err(CreateReservationError::RangeTooLong(MAX_RANGE_DAYS));
	}

	let dates: Vec<NaiveDate> = start
		.iter_days()
		.take_while(|d| *d <= end)
		.filter(|d| days.contains(&d.weekday()))
		.collect();

	if dates.is_empty() {
		return Err(CreateReservationError::NoMatchingDates);
	}

	Ok(dates)
}

/// A fresh group id, only for multi-date bookings by non-students
#[must_use]
pub fn group_id_for(
	dates: &[NaiveDate],
	requester: ParticipantRole,
) -> Option<Uuid> {
	(dates.len() > 1 && !requester.is_student()).then(Uuid::new_v4)
}

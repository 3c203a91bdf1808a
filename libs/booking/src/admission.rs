use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use common::{AdmissionConflict, AdmissionError, DbConn, Error};
use db::ParticipantRole;
use models::Reservation;
use serde::{Deserialize, Serialize};

/// Maximum number of approved student reservations sharing a slot
pub const STUDENT_QUOTA: usize = 20;

/// A single lab, date and time slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotKey {
	pub lab_id:       i32,
	pub date:         NaiveDate,
	pub time_slot_id: i32,
}

impl SlotKey {
	fn conflict(self, reason: AdmissionError) -> AdmissionConflict {
		AdmissionConflict {
			lab_id: self.lab_id,
			date: self.date,
			time_slot_id: self.time_slot_id,
			reason,
		}
	}
}

/// Number of approved reservations in a slot, by requester role
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoleTally {
	pub students: usize,
	pub faculty:  usize,
	pub staff:    usize,
	pub other:    usize,
}

impl RoleTally {
	pub fn from_roles<I: IntoIterator<Item = ParticipantRole>>(roles: I) -> Self {
		let mut tally = Self::default();

		for role in roles {
			tally.add(role);
		}

		tally
	}

	/// Count one more reservation by a requester of the given role
	pub fn add(&mut self, role: ParticipantRole) {
		match role {
			ParticipantRole::Student => self.students += 1,
			ParticipantRole::Faculty => self.faculty += 1,
			ParticipantRole::Staff => self.staff += 1,
			ParticipantRole::Other => self.other += 1,
		}
	}

	#[must_use]
	pub fn count(&self, role: ParticipantRole) -> usize {
		match role {
			ParticipantRole::Student => self.students,
			ParticipantRole::Faculty => self.faculty,
			ParticipantRole::Staff => self.staff,
			ParticipantRole::Other => self.other,
		}
	}

	#[must_use]
	pub fn total(&self) -> usize {
		self.students + self.faculty + self.staff + self.other
	}
}

/// Decide whether a requester of the given role may hold a slot that
/// already carries `tally`
///
/// # Errors
/// Returns the rule that would be broken
pub fn evaluate(
	requester: ParticipantRole,
	tally: &RoleTally,
) -> Result<(), AdmissionError> {
	let same = tally.count(requester);
	let different = tally.total() - same;

	if different > 0 {
		return Err(AdmissionError::OtherCategory);
	}

	if requester.is_student() {
		if same >= STUDENT_QUOTA {
			return Err(AdmissionError::StudentQuotaReached(STUDENT_QUOTA));
		}
	} else if same > 0 {
		return Err(AdmissionError::AlreadyHeld(requester));
	}

	Ok(())
}

/// What to do when the current occupancy of a slot cannot be fetched
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
	/// Log the failure and admit the reservation
	#[default]
	Open,
	/// Log the failure and refuse the reservation
	Closed,
}

impl FromStr for FailurePolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"open" => Ok(Self::Open),
			"closed" => Ok(Self::Closed),
			other => Err(format!("unknown admission failure policy '{other}'")),
		}
	}
}

impl fmt::Display for FailurePolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Open => write!(f, "open"),
			Self::Closed => write!(f, "closed"),
		}
	}
}

/// Apply the admission rules, or the failure policy if the occupancy of the
/// slot could not be fetched
fn decide(
	key: SlotKey,
	requester: ParticipantRole,
	tally: Result<RoleTally, Error>,
	policy: FailurePolicy,
) -> Result<(), AdmissionError> {
	match tally {
		Ok(tally) => evaluate(requester, &tally),
		Err(e) => {
			error!(
				"could not fetch occupancy of lab {} on {} for time slot {} \
				 ({policy} policy) -- {e}",
				key.lab_id, key.date, key.time_slot_id,
			);

			match policy {
				FailurePolicy::Open => Ok(()),
				FailurePolicy::Closed => Err(AdmissionError::Unverifiable),
			}
		},
	}
}

/// Apply the admission rules to the result of fetching a slot's occupancy
///
/// # Errors
/// Returns an [`AdmissionConflict`] if the rules refuse the reservation, or
/// if the occupancy could not be fetched under [`FailurePolicy::Closed`]
pub fn admit(
	key: SlotKey,
	requester: ParticipantRole,
	tally: Result<RoleTally, Error>,
	policy: FailurePolicy,
) -> Result<(), Error> {
	decide(key, requester, tally, policy).map_err(|e| key.conflict(e).into())
}

/// Decision shown to a user before they book a slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview {
	/// Known occupancy, empty if it could not be fetched
	pub tally:    RoleTally,
	pub decision: Result<(), AdmissionError>,
}

/// Same decision as [`admit`], without turning a refusal into an error
#[must_use]
pub fn preview(
	key: SlotKey,
	requester: ParticipantRole,
	tally: Result<RoleTally, Error>,
	policy: FailurePolicy,
) -> Preview {
	let known = tally.as_ref().ok().copied().unwrap_or_default();

	Preview { tally: known, decision: decide(key, requester, tally, policy) }
}

/// Occupancy of every slot touched by a set of approvals, including the
/// approvals admitted so far
#[derive(Clone, Debug, Default)]
pub struct Batch {
	running: HashMap<SlotKey, RoleTally>,
}

impl Batch {
	/// Occupancy of a slot this batch has already admitted into
	#[must_use]
	pub fn tally(&self, key: &SlotKey) -> Option<RoleTally> {
		self.running.get(key).copied()
	}

	/// Admit one more requester into a slot and count it for the rest of the
	/// batch
	///
	/// # Errors
	/// See [`admit`]
	pub fn admit(
		&mut self,
		key: SlotKey,
		requester: ParticipantRole,
		tally: Result<RoleTally, Error>,
		policy: FailurePolicy,
	) -> Result<(), Error> {
		let mut known = tally.as_ref().ok().copied().unwrap_or_default();

		admit(key, requester, tally, policy)?;

		known.add(requester);
		self.running.insert(key, known);

		Ok(())
	}
}

/// Fetch the approved occupancy of a single slot
async fn fetch(key: SlotKey, conn: &DbConn) -> Result<RoleTally, Error> {
	Reservation::approved_requester_roles(
		key.lab_id,
		key.date,
		key.time_slot_id,
		conn,
	)
	.await
	.map(RoleTally::from_roles)
}

/// Preview a single slot against the reservations currently approved for it
#[instrument(skip(conn))]
pub async fn check_preview(
	key: SlotKey,
	requester: ParticipantRole,
	policy: FailurePolicy,
	conn: &DbConn,
) -> Preview {
	preview(key, requester, fetch(key, conn).await, policy)
}

/// Check a single slot against the reservations currently approved for it
///
/// # Errors
/// See [`admit`]
#[instrument(skip(conn))]
pub async fn check(
	key: SlotKey,
	requester: ParticipantRole,
	policy: FailurePolicy,
	conn: &DbConn,
) -> Result<(), Error> {
	admit(key, requester, fetch(key, conn).await, policy)
}

/// Check every slot in turn, stopping at the first conflict
///
/// # Errors
/// See [`admit`]
pub async fn check_all<I>(
	keys: I,
	requester: ParticipantRole,
	policy: FailurePolicy,
	conn: &DbConn,
) -> Result<(), Error>
where
	I: IntoIterator<Item = SlotKey>,
{
	for key in keys {
		check(key, requester, policy, conn).await?;
	}

	Ok(())
}

/// Check a set of approvals, counting every admitted request against the
/// ones after it, and stop at the first conflict
///
/// # Errors
/// See [`admit`]
pub async fn check_batch<I>(
	requests: I,
	policy: FailurePolicy,
	conn: &DbConn,
) -> Result<(), Error>
where
	I: IntoIterator<Item = (SlotKey, ParticipantRole)>,
{
	let mut batch = Batch::default();

	for (key, requester) in requests {
		let tally = match batch.tally(&key) {
			Some(tally) => Ok(tally),
			None => fetch(key, conn).await,
		};

		batch.admit(key, requester, tally, policy)?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	const REQUESTERS: [ParticipantRole; 3] = [
		ParticipantRole::Student,
		ParticipantRole::Faculty,
		ParticipantRole::Staff,
	];

	fn tally(students: usize, faculty: usize, staff: usize) -> RoleTally {
		RoleTally { students, faculty, staff, other: 0 }
	}

	fn key() -> SlotKey {
		SlotKey {
			lab_id:       1,
			date:         NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
			time_slot_id: 3,
		}
	}

	#[test]
	fn decision_table() {
		for requester in REQUESTERS {
			for students in 0..=2 {
				for faculty in 0..=2 {
					for staff in 0..=2 {
						let t = tally(students, faculty, staff);
						let result = evaluate(requester, &t);

						let expected = match requester {
							ParticipantRole::Student if faculty + staff > 0 => {
								Err(AdmissionError::OtherCategory)
							},
							ParticipantRole::Student => Ok(()),
							ParticipantRole::Faculty if students + staff > 0 => {
								Err(AdmissionError::OtherCategory)
							},
							ParticipantRole::Faculty if faculty > 0 => {
								Err(AdmissionError::AlreadyHeld(requester))
							},
							ParticipantRole::Staff if students + faculty > 0 => {
								Err(AdmissionError::OtherCategory)
							},
							ParticipantRole::Staff if staff > 0 => {
								Err(AdmissionError::AlreadyHeld(requester))
							},
							_ => Ok(()),
						};

						assert_eq!(result, expected, "{requester:?} with {t:?}");
					}
				}
			}
		}
	}

	#[test]
	fn student_quota_boundary() {
		let nineteen = tally(19, 0, 0);
		assert_eq!(evaluate(ParticipantRole::Student, &nineteen), Ok(()));

		let twenty = tally(20, 0, 0);
		let err = evaluate(ParticipantRole::Student, &twenty).unwrap_err();

		assert_eq!(err, AdmissionError::StudentQuotaReached(20));
		assert!(err.to_string().contains("20 student reservations"));
	}

	#[test]
	fn faculty_blocked_by_single_student() {
		let err =
			evaluate(ParticipantRole::Faculty, &tally(1, 0, 0)).unwrap_err();

		assert_eq!(err, AdmissionError::OtherCategory);
		assert!(
			err.to_string()
				.contains("existing reservation of another category")
		);
	}

	#[test]
	fn other_role_is_exclusive() {
		let only_other = RoleTally { other: 1, ..RoleTally::default() };

		assert_eq!(
			evaluate(ParticipantRole::Other, &only_other),
			Err(AdmissionError::AlreadyHeld(ParticipantRole::Other)),
		);
		assert_eq!(
			evaluate(ParticipantRole::Student, &only_other),
			Err(AdmissionError::OtherCategory),
		);
		assert_eq!(
			evaluate(ParticipantRole::Other, &RoleTally::default()),
			Ok(())
		);
	}

	#[test]
	fn tally_counts_each_role() {
		let t = RoleTally::from_roles([
			ParticipantRole::Student,
			ParticipantRole::Student,
			ParticipantRole::Staff,
			ParticipantRole::Other,
		]);

		assert_eq!(t, RoleTally { students: 2, faculty: 0, staff: 1, other: 1 });
		assert_eq!(t.total(), 4);
	}

	#[test]
	fn fetch_failure_follows_policy() {
		let failing = || Err(Error::InternalServerError);

		assert!(
			admit(key(), ParticipantRole::Faculty, failing(), FailurePolicy::Open)
				.is_ok()
		);

		let err = admit(
			key(),
			ParticipantRole::Faculty,
			failing(),
			FailurePolicy::Closed,
		)
		.unwrap_err();

		assert!(matches!(
			err,
			Error::AdmissionConflict(AdmissionConflict {
				reason: AdmissionError::Unverifiable,
				..
			})
		));
	}

	#[test]
	fn conflict_carries_slot() {
		let err = admit(
			key(),
			ParticipantRole::Student,
			Ok(tally(0, 1, 0)),
			FailurePolicy::Open,
		)
		.unwrap_err();

		let Error::AdmissionConflict(conflict) = err else {
			panic!("expected an admission conflict, got {err:?}");
		};

		assert_eq!(conflict, key().conflict(AdmissionError::OtherCategory));
	}

	#[test]
	fn parse_policy() {
		assert_eq!("open".parse::<FailurePolicy>(), Ok(FailurePolicy::Open));
		assert_eq!(" Closed ".parse::<FailurePolicy>(), Ok(FailurePolicy::Closed));
		assert!("sometimes".parse::<FailurePolicy>().is_err());
		assert_eq!(FailurePolicy::default(), FailurePolicy::Open);
	}

	#[test]
	fn preview_follows_policy() {
		let failing = || Err(Error::InternalServerError);

		let open =
			preview(key(), ParticipantRole::Staff, failing(), FailurePolicy::Open);
		assert_eq!(open.tally, RoleTally::default());
		assert_eq!(open.decision, Ok(()));

		let closed = preview(
			key(),
			ParticipantRole::Staff,
			failing(),
			FailurePolicy::Closed,
		);
		assert_eq!(closed.decision, Err(AdmissionError::Unverifiable));

		let known = preview(
			key(),
			ParticipantRole::Staff,
			Ok(tally(0, 0, 1)),
			FailurePolicy::Closed,
		);
		assert_eq!(known.tally, tally(0, 0, 1));
		assert_eq!(
			known.decision,
			Err(AdmissionError::AlreadyHeld(ParticipantRole::Staff))
		);
	}

	#[test]
	fn batch_counts_earlier_approvals() {
		let mut batch = Batch::default();
		let policy = FailurePolicy::Open;

		assert_eq!(batch.tally(&key()), None);
		batch
			.admit(
				key(),
				ParticipantRole::Faculty,
				Ok(RoleTally::default()),
				policy,
			)
			.unwrap();
		assert_eq!(batch.tally(&key()), Some(tally(0, 1, 0)));

		let err = batch
			.admit(key(), ParticipantRole::Faculty, Ok(tally(0, 1, 0)), policy)
			.unwrap_err();

		assert!(matches!(
			err,
			Error::AdmissionConflict(AdmissionConflict {
				reason: AdmissionError::AlreadyHeld(ParticipantRole::Faculty),
				..
			})
		));

		// A refused request is not counted
		assert_eq!(batch.tally(&key()), Some(tally(0, 1, 0)));
	}

	#[test]
	fn batch_keeps_slots_apart() {
		let mut batch = Batch::default();
		let other = SlotKey { time_slot_id: 4, ..key() };

		for slot in [key(), other] {
			batch
				.admit(
					slot,
					ParticipantRole::Student,
					Ok(tally(19, 0, 0)),
					FailurePolicy::Open,
				)
				.unwrap();
		}

		let running = batch.tally(&key()).unwrap();
		let err = batch
			.admit(
				key(),
				ParticipantRole::Student,
				Ok(running),
				FailurePolicy::Open,
			)
			.unwrap_err();

		assert!(matches!(
			err,
			Error::AdmissionConflict(AdmissionConflict {
				reason: AdmissionError::StudentQuotaReached(20),
				..
			})
		));
		assert_eq!(batch.tally(&other), Some(tally(20, 0, 0)));
	}

	#[test]
	fn batch_counts_admissions_after_fetch_failure() {
		let mut batch = Batch::default();

		batch
			.admit(
				key(),
				ParticipantRole::Staff,
				Err(Error::InternalServerError),
				FailurePolicy::Open,
			)
			.unwrap();

		assert_eq!(batch.tally(&key()), Some(tally(0, 0, 1)));
	}
}

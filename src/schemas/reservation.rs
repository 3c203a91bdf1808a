use booking::admission::RoleTally;
use booking::recurrence::Schedule;
use chrono::NaiveDate;
use common::CreateReservationError;
use db::{ParticipantRole, ReservationState};
use models::NewParticipant;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate as _;
use validator_derive::Validate;

/// Most time slots a student may book in one request
pub const MAX_STUDENT_TIME_SLOTS: usize = 2;
/// Most additional members a student may bring along
pub const MAX_STUDENT_MEMBERS: usize = 19;

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
	#[validate(length(
		min = 1,
		max = 128,
		message = "name must be between 1 and 128 characters long",
		code = "name-length"
	))]
	pub name:           String,
	#[validate(length(
		min = 1,
		max = 32,
		message = "account number must be between 1 and 32 characters long",
		code = "account-number-length"
	))]
	pub account_number: String,
}

impl From<MemberRequest> for NewParticipant {
	fn from(value: MemberRequest) -> Self {
		Self {
			name:           value.name,
			account_number: value.account_number,
			email:          None,
			role:           ParticipantRole::Student,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
	pub lab_id:         i32,
	/// Role category of the requester
	pub role:           ParticipantRole,
	#[validate(length(
		min = 1,
		max = 128,
		message = "name must be between 1 and 128 characters long",
		code = "name-length"
	))]
	pub name:           String,
	#[validate(length(
		min = 1,
		max = 32,
		message = "account number must be between 1 and 32 characters long",
		code = "account-number-length"
	))]
	pub account_number: String,
	#[validate(length(
		min = 1,
		max = 1024,
		message = "purpose must be between 1 and 1024 characters long",
		code = "purpose-length"
	))]
	pub purpose:        String,
	pub time_slot_ids:  Vec<i32>,
	pub schedule:       Schedule,
	#[serde(default)]
	#[validate(nested)]
	pub members:        Vec<MemberRequest>,
}

impl CreateReservationRequest {
	/// Check the per-role form rules, returning the deduplicated slot ids
	///
	/// # Errors
	/// Fails if the slot selection or member list breaks a rule for the
	/// requester's role
	pub fn time_slots_for_role(&self) -> Result<Vec<i32>, CreateReservationError> {
		let mut slot_ids = self.time_slot_ids.clone();
		slot_ids.sort_unstable();
		slot_ids.dedup();

		if slot_ids.is_empty() {
			return Err(CreateReservationError::NoTimeSlots);
		}

		if self.role.is_student() {
			if slot_ids.len() > MAX_STUDENT_TIME_SLOTS {
				return Err(CreateReservationError::TooManyTimeSlots(
					MAX_STUDENT_TIME_SLOTS,
				));
			}

			if self.members.len() > MAX_STUDENT_MEMBERS {
				return Err(CreateReservationError::TooManyMembers(
					MAX_STUDENT_MEMBERS,
				));
			}
		} else if !self.members.is_empty() {
			return Err(CreateReservationError::MembersNotAllowed);
		}

		Ok(slot_ids)
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyReservationsQuery {
	pub state: Option<ReservationState>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionQuery {
	pub lab_id:       i32,
	pub date:         NaiveDate,
	pub time_slot_id: i32,
	pub role:         ParticipantRole,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
	pub allowed: bool,
	pub tally:   RoleTally,
	pub reason:  Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStateRequest {
	#[validate(length(
		min = 1,
		message = "at least one reservation id is required",
		code = "ids-length"
	))]
	pub ids:   Vec<i32>,
	pub state: ReservationState,
	/// Approve even if the admission rules would refuse it
	#[serde(default)]
	pub force: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request(role: ParticipantRole, slots: Vec<i32>, members: usize) -> CreateReservationRequest {
		CreateReservationRequest {
			lab_id: 1,
			role,
			name: "Ana Reyes".to_string(),
			account_number: "20251234".to_string(),
			purpose: "Networks practice".to_string(),
			time_slot_ids: slots,
			schedule: Schedule::Single {
				date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
			},
			members: (0..members)
				.map(|i| {
					MemberRequest {
						name:           format!("member {i}"),
						account_number: format!("2025{i:04}"),
					}
				})
				.collect(),
		}
	}

	#[test]
	fn student_slot_limit() {
		let ok = request(ParticipantRole::Student, vec![2, 1, 2], 0);
		assert_eq!(ok.time_slots_for_role().unwrap(), vec![1, 2]);

		let too_many = request(ParticipantRole::Student, vec![1, 2, 3], 0);
		assert!(matches!(
			too_many.time_slots_for_role(),
			Err(CreateReservationError::TooManyTimeSlots(2))
		));

		let faculty = request(ParticipantRole::Faculty, vec![1, 2, 3, 4], 0);
		assert_eq!(faculty.time_slots_for_role().unwrap().len(), 4);
	}

	#[test]
	fn member_limits() {
		let ok = request(ParticipantRole::Student, vec![1], 19);
		assert!(ok.time_slots_for_role().is_ok());

		let too_many = request(ParticipantRole::Student, vec![1], 20);
		assert!(matches!(
			too_many.time_slots_for_role(),
			Err(CreateReservationError::TooManyMembers(19))
		));

		let staff = request(ParticipantRole::Staff, vec![1], 1);
		assert!(matches!(
			staff.time_slots_for_role(),
			Err(CreateReservationError::MembersNotAllowed)
		));
	}

	#[test]
	fn needs_a_slot() {
		let none = request(ParticipantRole::Faculty, vec![], 0);

		assert!(matches!(
			none.time_slots_for_role(),
			Err(CreateReservationError::NoTimeSlots)
		));
	}
}

use std::collections::{BTreeMap, BTreeSet};

use models::Lab;
use serde::Serialize;

/// Hours a single booked time slot accounts for
pub const SLOT_HOURS: f64 = 1.33;
/// Default number of bookable hours in a day
pub const DEFAULT_MAX_HOURS_PER_DAY: f64 = 15.0;
/// Teaching days in a week
pub const DAYS_PER_WEEK: f64 = 5.5;
/// Teaching days in a quarter
pub const DAYS_PER_QUARTER: f64 = 60.0;

/// Round to two decimals
#[must_use]
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// Occupancy of a lab expressed against daily, weekly and quarterly capacity
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
	pub slots:     usize,
	pub hours:     f64,
	pub daily:     f64,
	pub weekly:    f64,
	pub quarterly: f64,
}

impl Usage {
	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub fn from_slot_count(slots: usize, max_hours_per_day: f64) -> Self {
		let hours = slots as f64 * SLOT_HOURS;
		let percent = |capacity: f64| round2(hours / capacity * 100.0);

		Self {
			slots,
			hours: round2(hours),
			daily: percent(max_hours_per_day),
			weekly: percent(max_hours_per_day * DAYS_PER_WEEK),
			quarterly: percent(max_hours_per_day * DAYS_PER_QUARTER),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabUsage {
	pub lab:   Lab,
	#[serde(flatten)]
	pub usage: Usage,
}

/// Count the distinct time slots booked per lab from `(lab_id, slot_id)`
/// pairs
#[must_use]
pub fn slots_per_lab(pairs: &[(i32, i32)]) -> BTreeMap<i32, usize> {
	let mut slots: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();

	for (lab_id, slot_id) in pairs {
		slots.entry(*lab_id).or_default().insert(*slot_id);
	}

	slots.into_iter().map(|(lab_id, s)| (lab_id, s.len())).collect()
}

/// Compute the usage of every given lab, unbooked labs reporting zero
#[must_use]
pub fn usage_per_lab(
	labs: Vec<Lab>,
	pairs: &[(i32, i32)],
	max_hours_per_day: f64,
) -> Vec<LabUsage> {
	let counts = slots_per_lab(pairs);

	labs.into_iter()
		.map(|lab| {
			let slots = counts.get(&lab.id).copied().unwrap_or_default();

			LabUsage { lab, usage: Usage::from_slot_count(slots, max_hours_per_day) }
		})
		.collect()
}

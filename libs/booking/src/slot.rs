use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// The start and end time encoded in a time slot label such as
/// `"08:00 am - 09:20 am"`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SlotSpan {
	pub start: NaiveTime,
	pub end:   NaiveTime,
}

fn parse_time(value: &str) -> Option<NaiveTime> {
	let value = value.trim().to_uppercase();

	NaiveTime::parse_from_str(&value, "%I:%M %p")
		.or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M"))
		.ok()
}

impl SlotSpan {
	/// Parse a label, `None` if it is not a valid increasing time range
	#[must_use]
	pub fn parse(label: &str) -> Option<Self> {
		let (start, end) = label.split_once('-')?;
		let start = parse_time(start)?;
		let end = parse_time(end)?;

		(start < end).then_some(Self { start, end })
	}

	/// The concrete start and end of this span on a given date
	#[must_use]
	pub fn on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
		(date.and_time(self.start), date.and_time(self.end))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn time(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

	#[test]
	fn parse_twelve_hour_labels() {
		let span = SlotSpan::parse("08:00 am - 09:20 am").unwrap();
		assert_eq!(span, SlotSpan { start: time(8, 0), end: time(9, 20) });

		let span = SlotSpan::parse("11:40 am - 01:00 pm").unwrap();
		assert_eq!(span, SlotSpan { start: time(11, 40), end: time(13, 0) });

		let span = SlotSpan::parse("12:00 pm-1:20 PM").unwrap();
		assert_eq!(span, SlotSpan { start: time(12, 0), end: time(13, 20) });
	}

	#[test]
	fn parse_twenty_four_hour_labels() {
		let span = SlotSpan::parse("14:00 - 15:20").unwrap();

		assert_eq!(span, SlotSpan { start: time(14, 0), end: time(15, 20) });
	}

	#[test]
	fn reject_invalid_labels() {
		assert_eq!(SlotSpan::parse("morning"), None);
		assert_eq!(SlotSpan::parse("09:20 am - 08:00 am"), None);
		assert_eq!(SlotSpan::parse("25:00 - 26:00"), None);
	}

	#[test]
	fn span_on_date() {
		let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
		let (start, end) = SlotSpan::parse("01:00 pm - 02:20 pm").unwrap().on(date);

		assert_eq!(start, date.and_hms_opt(13, 0, 0).unwrap());
		assert_eq!(end, date.and_hms_opt(14, 20, 0).unwrap());
	}
}

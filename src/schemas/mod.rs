use serde::de::Visitor;

pub mod auth;
pub mod calendar;
pub mod incident;
pub mod lab;
pub mod mail;
pub mod pagination;
pub mod quarter;
pub mod reservation;
pub mod usage;

/// A visitor for bounded u32 values.
struct BoundedU32Visitor {
	start: u32,
	end:   u32,
}

impl Visitor<'_> for BoundedU32Visitor {
	type Value = u32;

	/// The expected format for the value.
	fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "a number between {} and {}", self.start, self.end)
	}

	/// Check if the value is within the specified bounds.
	fn visit_u32<E>(self, v: u32) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		if (self.start..=self.end).contains(&v) {
			Ok(v)
		} else {
			Err(E::custom(format_args!(
				"invalid value: {v}, expected a number between {} and {}",
				self.start, self.end,
			)))
		}
	}

	fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		let v = u32::try_from(v).map_err(|_| {
			E::custom(format_args!("invalid value: {v}, number too large"))
		})?;

		self.visit_u32(v)
	}
}

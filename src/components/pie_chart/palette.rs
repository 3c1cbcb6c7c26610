//! Path-state taxonomy and its display colors.

use std::fmt;
use std::str::FromStr;

/// Color for categories outside the taxonomy.
pub const UNRECOGNIZED_COLOR: &str = "#9e9e9e";

/// Connectivity outcome of a path measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeState {
	/// Connection works with and without the feature under test.
	Safe,
	/// The target itself breaks.
	BrokenSite,
	/// Something on the path breaks.
	BrokenPath,
	/// Broken, but neither site nor path is to blame.
	BrokenOther,
	/// Not enough data to tell.
	Unknown,
}

impl ProbeState {
	/// Every state, in legend order.
	pub const ALL: [ProbeState; 5] = [
		ProbeState::Safe,
		ProbeState::BrokenSite,
		ProbeState::BrokenPath,
		ProbeState::BrokenOther,
		ProbeState::Unknown,
	];

	/// Name as used by the service.
	pub fn as_str(self) -> &'static str {
		match self {
			ProbeState::Safe => "safe",
			ProbeState::BrokenSite => "broken_site",
			ProbeState::BrokenPath => "broken_path",
			ProbeState::BrokenOther => "broken_other",
			ProbeState::Unknown => "unknown",
		}
	}

	/// Display color as CSS hex.
	pub fn color(self) -> &'static str {
		match self {
			ProbeState::Safe => "#00de41",
			ProbeState::BrokenSite => "#ff3c3c",
			ProbeState::BrokenPath => "#ff840c",
			ProbeState::BrokenOther => "#f1ff15",
			ProbeState::Unknown => "#d27bff",
		}
	}
}

impl fmt::Display for ProbeState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a category name is not part of the taxonomy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl FromStr for ProbeState {
	type Err = UnknownState;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ProbeState::ALL
			.into_iter()
			.find(|state| state.as_str() == s)
			.ok_or_else(|| UnknownState(s.to_string()))
	}
}

/// Display color for a category name; [`UNRECOGNIZED_COLOR`] for anything
/// outside the taxonomy.
pub fn state_color(state: &str) -> &'static str {
	state
		.parse::<ProbeState>()
		.map(ProbeState::color)
		.unwrap_or(UNRECOGNIZED_COLOR)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_state_has_its_color() {
		assert_eq!(state_color("safe"), "#00de41");
		assert_eq!(state_color("broken_site"), "#ff3c3c");
		assert_eq!(state_color("broken_path"), "#ff840c");
		assert_eq!(state_color("broken_other"), "#f1ff15");
		assert_eq!(state_color("unknown"), "#d27bff");
	}

	#[test]
	fn other_inputs_get_the_fallback() {
		assert_eq!(state_color(""), UNRECOGNIZED_COLOR);
		assert_eq!(state_color("Safe"), UNRECOGNIZED_COLOR);
		assert_eq!(state_color("offline"), UNRECOGNIZED_COLOR);
		assert!(ProbeState::ALL.iter().all(|s| s.color() != UNRECOGNIZED_COLOR));
	}

	#[test]
	fn names_round_trip() {
		for state in ProbeState::ALL {
			assert_eq!(state.to_string().parse::<ProbeState>(), Ok(state));
		}
		assert_eq!(
			"incomplete".parse::<ProbeState>(),
			Err(UnknownState("incomplete".into()))
		);
	}
}

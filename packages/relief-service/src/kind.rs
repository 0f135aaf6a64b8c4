use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Record types reachable from the boundary by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
	Demand,
	Supply,
	Matches,
	Raw,
	Volunteer,
}
impl RecordKind {
	pub const ALL: [Self; 5] = [Self::Demand, Self::Supply, Self::Matches, Self::Raw, Self::Volunteer];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Demand => "demand",
			Self::Supply => "supply",
			Self::Matches => "matches",
			Self::Raw => "raw",
			Self::Volunteer => "volunteer",
		}
	}
}

impl fmt::Display for RecordKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RecordKind {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"demand" | "demands" | "request" | "requests" => Ok(Self::Demand),
			"supply" | "supplies" => Ok(Self::Supply),
			"matches" | "match" => Ok(Self::Matches),
			"raw" => Ok(Self::Raw),
			"volunteer" | "volunteers" => Ok(Self::Volunteer),
			other => Err(Error::validation(format!("Unknown record type {other:?}."))),
		}
	}
}

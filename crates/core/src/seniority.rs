//! Seniority

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::parse::{UnknownVariant, normalise_key};

/// Seniority ladder, ordered from most junior to most senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    /// Junior engineer.
    Junior,

    /// Mid-level engineer.
    Mid,

    /// Senior engineer.
    Senior,

    /// Lead or staff engineer.
    Lead,

    /// Principal engineer.
    Principal,
}

impl Seniority {
    /// Every rung of the ladder, in order.
    pub const ALL: [Self; 5] = [
        Self::Junior,
        Self::Mid,
        Self::Senior,
        Self::Lead,
        Self::Principal,
    ];

    /// Position on the ladder, starting at zero.
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Junior => 0,
            Self::Mid => 1,
            Self::Senior => 2,
            Self::Lead => 3,
            Self::Principal => 4,
        }
    }

    /// Number of rungs between `self` and `other`.
    pub const fn steps_from(self, other: Self) -> u8 {
        self.ordinal().abs_diff(other.ordinal())
    }

    /// Canonical storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Lead => "lead",
            Self::Principal => "principal",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Seniority {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalise_key(value).as_str() {
            "junior" | "entry" | "entry_level" => Ok(Self::Junior),
            "mid" | "mid_level" | "midlevel" | "middle" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            "lead" | "staff" => Ok(Self::Lead),
            "principal" => Ok(Self::Principal),
            _ => Err(UnknownVariant::new("seniority", value)),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::issue::ParseEnumError;

/// The fixed municipal department roster.
///
/// The roster is closed: departments are seeded once at deployment and
/// referenced by id everywhere else, so an enum (rather than a free-form
/// string) keeps every issue and worker pointing at a real department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Pwd,
    Water,
    Swm,
    Traffic,
    Health,
    Environment,
    Electricity,
    Disaster,
    Admin,
}

/// Roster order; also the rank tie-break order.
pub const ALL_DEPARTMENTS: [Department; 9] = [
    Department::Pwd,
    Department::Water,
    Department::Swm,
    Department::Traffic,
    Department::Health,
    Department::Environment,
    Department::Electricity,
    Department::Disaster,
    Department::Admin,
];

impl Department {
    /// Stable document id used in store records.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Pwd => "pwd",
            Self::Water => "water",
            Self::Swm => "swm",
            Self::Traffic => "traffic",
            Self::Health => "health",
            Self::Environment => "environment",
            Self::Electricity => "electricity",
            Self::Disaster => "disaster",
            Self::Admin => "admin",
        }
    }

    /// Three-letter department code used in issue ids and terse listings.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pwd => "PWD",
            Self::Water => "WSS",
            Self::Swm => "SWM",
            Self::Traffic => "TRF",
            Self::Health => "HSN",
            Self::Environment => "ENV",
            Self::Electricity => "ELC",
            Self::Disaster => "DMG",
            Self::Admin => "ADM",
        }
    }

    /// Full public-facing department name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pwd => "Public Works Department",
            Self::Water => "Water Supply & Sewage",
            Self::Swm => "Solid Waste Management",
            Self::Traffic => "Traffic Police / Transport Department",
            Self::Health => "Health & Sanitation Department",
            Self::Environment => "Environment & Parks Department",
            Self::Electricity => "Electricity Department",
            Self::Disaster => "Disaster Management / Emergency Response",
            Self::Admin => "Administration",
        }
    }

    /// The display-name variants a department publishes under on the citizen
    /// feed. Post attribution in scoring matches authors against this set:
    /// the full name, the code, and the department's feed account handle.
    #[must_use]
    pub fn display_names(self) -> [String; 3] {
        [
            self.name().to_string(),
            self.code().to_string(),
            format!("{}_dept", self.id()),
        ]
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Department {
    type Err = ParseEnumError;

    /// Accepts the document id (`water`) or the code (`WSS`), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        for dept in ALL_DEPARTMENTS {
            if normalized == dept.id() || normalized == dept.code().to_ascii_lowercase() {
                return Ok(dept);
            }
        }
        Err(ParseEnumError {
            expected: "department",
            got: s.to_string(),
        })
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the eight canonical ABO/Rh blood types.
///
/// The serialized form is the canonical string (`"A+"`, `"AB-"`, ...).
/// Parsing is case-insensitive and ignores surrounding whitespace, so `"ab+"`
/// and `" O- "` are both accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BloodType {
    /// A positive.
    APositive,
    /// A negative.
    ANegative,
    /// B positive.
    BPositive,
    /// B negative.
    BNegative,
    /// AB positive.
    AbPositive,
    /// AB negative.
    AbNegative,
    /// O positive.
    OPositive,
    /// O negative.
    ONegative,
}

impl BloodType {
    /// All blood types, in canonical display order.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Returns the canonical string form, e.g. `"AB+"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }

    /// Position of this type within [`BloodType::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns a descriptive label such as `"A Positive (A+)"`.
    #[must_use]
    pub fn label(self) -> String {
        let (group, sign) = self.as_str().split_at(self.as_str().len() - 1);
        let rh = if sign == "+" { "Positive" } else { "Negative" };
        format!("{group} {rh} ({self})")
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the canonical blood types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid blood type '{0}': expected one of A+, A-, B+, B-, AB+, AB-, O+, O-")]
pub struct ParseError(String);

impl FromStr for BloodType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|blood_type| blood_type.as_str() == normalized)
            .ok_or_else(|| ParseError(s.to_string()))
    }
}

impl TryFrom<String> for BloodType {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for BloodType {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodType> for String {
    fn from(value: BloodType) -> Self {
        value.as_str().to_string()
    }
}

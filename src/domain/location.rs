use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// A state / district / city triple.
///
/// The three levels form a strict containment hierarchy, but the hierarchy is
/// never declared up front: it is whatever the loaded records say it is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    state: NonEmptyString,
    district: NonEmptyString,
    city: NonEmptyString,
}

impl Location {
    /// Create a location from its three levels.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyLevelError`] naming the first level that is empty or
    /// only whitespace.
    pub fn new(
        state: impl Into<String>,
        district: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<Self, EmptyLevelError> {
        Ok(Self {
            state: level(state.into(), "state")?,
            district: level(district.into(), "district")?,
            city: level(city.into(), "city")?,
        })
    }

    /// The top level.
    #[must_use]
    pub fn state(&self) -> &str {
        self.state.as_str()
    }

    /// The middle level.
    #[must_use]
    pub fn district(&self) -> &str {
        self.district.as_str()
    }

    /// The bottom level.
    #[must_use]
    pub fn city(&self) -> &str {
        self.city.as_str()
    }
}

// Criteria treat blank input as unconstrained, so a blank level could never
// be selected.
fn level(value: String, name: &'static str) -> Result<NonEmptyString, EmptyLevelError> {
    if value.trim().is_empty() {
        return Err(EmptyLevelError(name));
    }
    NonEmptyString::new(value).map_err(|_| EmptyLevelError(name))
}

#[derive(Deserialize)]
struct RawLocation {
    state: String,
    district: String,
    city: String,
}

impl TryFrom<RawLocation> for Location {
    type Error = EmptyLevelError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Self::new(raw.state, raw.district, raw.city)
    }
}

/// Error returned when one of the levels of a [`Location`] is empty.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("location {0} must not be empty")]
pub struct EmptyLevelError(&'static str);

/// A record that sits somewhere in the location hierarchy.
///
/// Donors and blood banks both implement this, which is what lets the
/// hierarchical filters work over either collection.
pub trait LocationRecord {
    /// The record's unique identifier.
    fn id(&self) -> &str;

    /// Where the record is.
    fn location(&self) -> &Location;
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn accessors_return_each_level() {
        let location = Location::new("Kerala", "Ernakulam", "Kochi").unwrap();
        assert_eq!(location.state(), "Kerala");
        assert_eq!(location.district(), "Ernakulam");
        assert_eq!(location.city(), "Kochi");
    }

    #[test]
    fn empty_level_is_rejected() {
        assert_eq!(
            Location::new("Kerala", "", "Kochi").unwrap_err(),
            EmptyLevelError("district")
        );
        assert_eq!(
            Location::new("", "", "").unwrap_err(),
            EmptyLevelError("state")
        );
    }

    #[test_case("  ", "Ernakulam", "Kochi", "state")]
    #[test_case("Kerala", "\t", "Kochi", "district")]
    #[test_case("Kerala", "Ernakulam", " \n ", "city")]
    fn whitespace_level_is_rejected(state: &str, district: &str, city: &str, level: &'static str) {
        assert_eq!(
            Location::new(state, district, city).unwrap_err(),
            EmptyLevelError(level)
        );
    }

    #[test_case(r#"{"state":"Kerala","district":"Ernakulam","city":""}"#; "empty city")]
    #[test_case(r#"{"state":"  ","district":"Ernakulam","city":"Kochi"}"#; "blank state")]
    fn deserializing_blank_level_fails(json: &str) {
        assert!(serde_json::from_str::<Location>(json).is_err());
    }

    #[test]
    fn deserializing_keeps_levels() {
        let json = r#"{"state":"Goa","district":"North Goa","city":"Panaji"}"#;
        let location: Location = serde_json::from_str(json).unwrap();
        assert_eq!(location, Location::new("Goa", "North Goa", "Panaji").unwrap());
    }
}

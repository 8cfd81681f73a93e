use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{BloodType, Location, LocationRecord, filter::Filterable};

/// A registered blood donor from the reference directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    /// Unique identifier.
    pub id: String,
    /// Donor's full name.
    pub full_name: String,
    /// The donor's blood type.
    pub blood_type: BloodType,
    /// When the donor last gave blood, if known.
    #[serde(
        default,
        alias = "lastDonationDate",
        deserialize_with = "blank_date_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_donation: Option<NaiveDate>,
    /// Contact number.
    pub phone_number: String,
    /// Where the donor lives.
    #[serde(flatten)]
    pub location: Location,
}

impl LocationRecord for Donor {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

impl Filterable for Donor {
    fn offers(&self, blood_type: BloodType) -> bool {
        self.blood_type == blood_type
    }
}

// The bundled directory writes "" for donors who have never donated.
fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(date) => date.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

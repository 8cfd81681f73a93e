use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    BloodType,
    validation::{self, Context, Field, FieldErrors, InputKind, Rule, parse_date},
};

/// Points awarded for each completed donation.
pub const POINTS_PER_DONATION: u32 = 10;

/// The fields of the donor profile form, in display order.
pub const PROFILE_FIELDS: &[Field] = &[
    Field {
        key: "fullName",
        label: "Full name",
        input: InputKind::Text,
        rules: &[Rule::Required],
    },
    Field {
        key: "bloodType",
        label: "Blood type",
        input: InputKind::Choice,
        rules: &[Rule::Required, Rule::BloodType],
    },
    Field {
        key: "phoneNumber",
        label: "Phone number",
        input: InputKind::Phone,
        rules: &[Rule::Required, Rule::PhoneNumber],
    },
    Field {
        key: "age",
        label: "Age",
        input: InputKind::Numeric,
        rules: &[
            Rule::Required,
            Rule::IntRange {
                min: Some(18),
                max: Some(65),
            },
        ],
    },
    Field {
        key: "weight",
        label: "Weight",
        input: InputKind::Numeric,
        rules: &[
            Rule::Required,
            Rule::IntRange {
                min: Some(45),
                max: Some(300),
            },
        ],
    },
    Field {
        key: "address",
        label: "Address",
        input: InputKind::Text,
        rules: &[Rule::Required],
    },
    Field {
        key: "city",
        label: "City",
        input: InputKind::Text,
        rules: &[Rule::Required],
    },
    Field {
        key: "lastDonation",
        label: "Last donation",
        input: InputKind::Date,
        rules: &[Rule::Date],
    },
    Field {
        key: "medicalConditions",
        label: "Medical conditions",
        input: InputKind::Text,
        rules: &[],
    },
];

/// The donor profile form as typed, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDraft {
    /// Full name.
    pub full_name: String,
    /// Blood type, any case.
    pub blood_type: String,
    /// Ten-digit phone number.
    pub phone_number: String,
    /// Age in whole years.
    pub age: String,
    /// Weight in whole kilograms.
    pub weight: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Optional `YYYY-MM-DD` date of the last donation.
    pub last_donation: String,
    /// Optional free text.
    pub medical_conditions: String,
}

impl ProfileDraft {
    fn value(&self, key: &str) -> Option<&str> {
        Some(match key {
            "fullName" => &self.full_name,
            "bloodType" => &self.blood_type,
            "phoneNumber" => &self.phone_number,
            "age" => &self.age,
            "weight" => &self.weight,
            "address" => &self.address,
            "city" => &self.city,
            "lastDonation" => &self.last_donation,
            "medicalConditions" => &self.medical_conditions,
            _ => return None,
        })
    }

    /// Validate the draft and build a profile for `uid`.
    ///
    /// New profiles are available to donate and start with zero points.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldErrors`] listing every field that fails
    /// [`PROFILE_FIELDS`].
    pub fn validate(
        &self,
        uid: impl Into<String>,
        email: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, FieldErrors> {
        let context = Context {
            today: now.date_naive(),
        };
        validation::validate(PROFILE_FIELDS, |key| self.value(key), &context)?;

        let blood_type = self
            .blood_type
            .parse::<BloodType>()
            .map_err(|e| FieldErrors::single("bloodType", e.to_string()))?;
        let age = self
            .age
            .trim()
            .parse::<u8>()
            .map_err(|_| FieldErrors::single("age", "Age must be a whole number"))?;
        let weight = self
            .weight
            .trim()
            .parse::<u16>()
            .map_err(|_| FieldErrors::single("weight", "Weight must be a whole number"))?;

        let medical_conditions = self.medical_conditions.trim();
        Ok(UserProfile {
            uid: uid.into(),
            email: email.into(),
            full_name: self.full_name.trim().to_string(),
            blood_type,
            phone_number: self.phone_number.trim().to_string(),
            age,
            weight,
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            last_donation: parse_date(&self.last_donation),
            medical_conditions: (!medical_conditions.is_empty())
                .then(|| medical_conditions.to_string()),
            is_available_to_donate: true,
            points: Some(0),
            created_at: now,
        })
    }
}

/// A registered user's donor profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Identity provider's user id.
    pub uid: String,
    /// Sign-in email.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Blood type.
    pub blood_type: BloodType,
    /// Ten-digit phone number.
    pub phone_number: String,
    /// Age in years.
    pub age: u8,
    /// Weight in kilograms.
    pub weight: u16,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Date of the most recent donation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_donation: Option<NaiveDate>,
    /// Free-text medical notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    /// Whether the user currently wants to be contacted to donate.
    pub is_available_to_donate: bool,
    /// Reward points. Profiles created before points existed have none.
    #[serde(default)]
    pub points: Option<u32>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Current points, treating a profile without points as zero.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points.unwrap_or_default()
    }

    /// Give the profile a zero balance if it has none.
    ///
    /// Returns `true` if the balance was initialized, `false` if it already
    /// existed.
    pub fn ensure_points(&mut self) -> bool {
        if self.points.is_some() {
            return false;
        }
        self.points = Some(0);
        info!(uid = %self.uid, "initialized points");
        true
    }

    /// Record a completed donation on `date` and award points for it.
    ///
    /// Returns the new balance.
    pub fn award_donation(&mut self, date: NaiveDate) -> u32 {
        let balance = self.points().saturating_add(POINTS_PER_DONATION);
        self.points = Some(balance);
        self.last_donation = Some(self.last_donation.map_or(date, |last| last.max(date)));
        balance
    }
}

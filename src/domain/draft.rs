use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{
    BloodType, Units, Urgency,
    blood_type::ParseError,
    validation::{self, Context, Field, FieldErrors, InputKind, Rule, parse_date},
};

/// The fields of a blood request form, in display order.
pub const REQUEST_FIELDS: &[Field] = &[
    Field {
        key: "patientName",
        label: "Patient name",
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
        key: "unitsNeeded",
        label: "Number of units",
        input: InputKind::Numeric,
        rules: &[Rule::Required, Rule::Units],
    },
    Field {
        key: "neededByDate",
        label: "Blood requirement date",
        input: InputKind::Date,
        rules: &[Rule::Required, Rule::Date, Rule::NotBeforeToday],
    },
    Field {
        key: "hospital",
        label: "Hospital name",
        input: InputKind::Text,
        rules: &[Rule::Required],
    },
    Field {
        key: "contactNumber",
        label: "Contact number",
        input: InputKind::Phone,
        rules: &[Rule::Required, Rule::PhoneNumber],
    },
    Field {
        key: "message",
        label: "Message",
        input: InputKind::Text,
        rules: &[Rule::MaxChars(500)],
    },
];

/// A blood request as typed into a form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestDraft {
    /// Who the blood is for.
    pub patient_name: String,
    /// Blood type, any case.
    pub blood_type: String,
    /// Units as a decimal string, e.g. `"1.5"`.
    pub units_needed: String,
    /// Date in `YYYY-MM-DD` form.
    pub needed_by_date: String,
    /// Hospital name.
    pub hospital: String,
    /// Ten-digit contact number.
    pub contact_number: String,
    /// Optional note.
    pub message: String,
    /// Urgency; defaults to normal.
    pub urgency: Urgency,
}

impl RequestDraft {
    fn value(&self, key: &str) -> Option<&str> {
        Some(match key {
            "patientName" => &self.patient_name,
            "bloodType" => &self.blood_type,
            "unitsNeeded" => &self.units_needed,
            "neededByDate" => &self.needed_by_date,
            "hospital" => &self.hospital,
            "contactNumber" => &self.contact_number,
            "message" => &self.message,
            _ => return None,
        })
    }

    /// Validate the draft as submitted on `today`.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldErrors`] listing every field that fails
    /// [`REQUEST_FIELDS`].
    pub fn validate(&self, today: NaiveDate) -> Result<NewRequest, FieldErrors> {
        validation::validate(REQUEST_FIELDS, |key| self.value(key), &Context { today })?;

        let blood_type = self
            .blood_type
            .parse::<BloodType>()
            .map_err(|e: ParseError| FieldErrors::single("bloodType", e.to_string()))?;
        let units_needed = self
            .units_needed
            .trim()
            .parse::<f64>()
            .map_err(|_| FieldErrors::single("unitsNeeded", "Number of units must be a number"))
            .and_then(|amount| {
                Units::new(amount).map_err(|e| FieldErrors::single("unitsNeeded", e.to_string()))
            })?;
        let needed_by_date = parse_date(&self.needed_by_date).ok_or_else(|| {
            FieldErrors::single("neededByDate", "Blood requirement date must be a date")
        })?;

        let message = self.message.trim();
        Ok(NewRequest {
            patient_name: self.patient_name.trim().to_string(),
            blood_type,
            units_needed,
            hospital: self.hospital.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            needed_by_date,
            urgency: self.urgency,
            message: (!message.is_empty()).then(|| message.to_string()),
        })
    }
}

/// A validated request, ready to hand to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    /// Who the blood is for.
    pub patient_name: String,
    /// Blood type needed.
    pub blood_type: BloodType,
    /// Units needed.
    pub units_needed: Units,
    /// Hospital name.
    pub hospital: String,
    /// Ten-digit contact number.
    pub contact_number: String,
    /// The date by which the blood is needed.
    pub needed_by_date: NaiveDate,
    /// How urgent the request is.
    pub urgency: Urgency,
    /// Optional note.
    pub message: Option<String>,
}

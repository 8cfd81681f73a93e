//! Declarative form validation.
//!
//! Each form is described by a static table of [`Field`]s. A field names its
//! key, the kind of input it expects and the rules its raw value must pass.
//! Validation walks the table uniformly, so the rules for a form can be
//! listed and inspected without running it.

use std::{collections::BTreeMap, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::{BloodType, request::Units};

static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone number pattern is valid"));

/// The kind of input control a field is entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Free text.
    Text,
    /// Digits only, dialled as a phone number.
    Phone,
    /// A number.
    Numeric,
    /// A calendar date (`YYYY-MM-DD`).
    Date,
    /// One of a fixed set of choices.
    Choice,
}

/// A single check applied to a raw field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The value must not be blank. Without this rule a blank value skips
    /// every other check.
    Required,
    /// One of the canonical blood types, case-insensitive.
    BloodType,
    /// Exactly ten ASCII digits.
    PhoneNumber,
    /// An integer within the given inclusive bounds.
    IntRange {
        /// Smallest accepted value.
        min: Option<i64>,
        /// Largest accepted value.
        max: Option<i64>,
    },
    /// At most this many characters.
    MaxChars(usize),
    /// A blood unit amount, see [`Units`].
    Units,
    /// A `YYYY-MM-DD` date.
    Date,
    /// A date no earlier than the validation context's `today`.
    NotBeforeToday,
}

/// Information a rule may need beyond the value itself.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// The date the form is being submitted.
    pub today: NaiveDate,
}

/// One entry in a form's field table.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Key used in stored documents and in [`FieldErrors`].
    pub key: &'static str,
    /// Human readable name used in messages.
    pub label: &'static str,
    /// How the value is entered.
    pub input: InputKind,
    /// Checks applied in order; the first failure is reported.
    pub rules: &'static [Rule],
}

impl Field {
    /// Check a raw value against this field's rules.
    ///
    /// # Errors
    ///
    /// Returns the message for the first rule that fails.
    pub fn check(&self, value: &str, context: &Context) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return if self.rules.contains(&Rule::Required) {
                Err(format!("{} is required", self.label))
            } else {
                Ok(())
            };
        }
        for rule in self.rules {
            self.apply(*rule, value, context)?;
        }
        Ok(())
    }

    fn apply(&self, rule: Rule, value: &str, context: &Context) -> Result<(), String> {
        let label = self.label;
        match rule {
            Rule::Required => Ok(()),
            Rule::BloodType => value
                .parse::<BloodType>()
                .map(|_| ())
                .map_err(|_| format!("Invalid {}", label.to_lowercase())),
            Rule::PhoneNumber => {
                if PHONE_NUMBER.is_match(value) {
                    Ok(())
                } else {
                    Err(format!("{label} must be 10 digits"))
                }
            }
            Rule::IntRange { min, max } => {
                let number: i64 = value
                    .parse()
                    .map_err(|_| format!("{label} must be a whole number"))?;
                match (min, max) {
                    (Some(min), Some(max)) if !(min..=max).contains(&number) => {
                        Err(format!("{label} must be between {min} and {max}"))
                    }
                    (Some(min), None) if number < min => {
                        Err(format!("{label} must be at least {min}"))
                    }
                    (None, Some(max)) if number > max => {
                        Err(format!("{label} cannot exceed {max}"))
                    }
                    _ => Ok(()),
                }
            }
            Rule::MaxChars(limit) => {
                if value.chars().count() > limit {
                    Err(format!("{label} cannot exceed {limit} characters"))
                } else {
                    Ok(())
                }
            }
            Rule::Units => value
                .parse::<f64>()
                .map_err(|_| format!("{label} must be a number"))
                .and_then(|amount| Units::new(amount).map_err(|e| e.to_string()))
                .map(|_| ()),
            Rule::Date => parse_date(value)
                .map(|_| ())
                .ok_or_else(|| format!("{label} must be a date (YYYY-MM-DD)")),
            Rule::NotBeforeToday => match parse_date(value) {
                Some(date) if date < context.today => {
                    Err(format!("{label} cannot be in the past"))
                }
                _ => Ok(()),
            },
        }
    }
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Validate every field in `fields`, looking each value up with `value_of`.
///
/// A field whose value is absent is treated as blank.
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate<'v>(
    fields: &[Field],
    value_of: impl Fn(&str) -> Option<&'v str>,
    context: &Context,
) -> Result<(), FieldErrors> {
    let errors: BTreeMap<_, _> = fields
        .iter()
        .filter_map(|field| {
            field
                .check(value_of(field.key).unwrap_or_default(), context)
                .err()
                .map(|message| (field.key, message))
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(FieldErrors(errors))
    }
}

/// Validation failures, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.values().map(String::as_str).collect::<Vec<_>>().join("; "))]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub(crate) fn single(key: &'static str, message: impl Into<String>) -> Self {
        Self(BTreeMap::from([(key, message.into())]))
    }

    /// The message for `key`, if that field failed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Keys of every failing field, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

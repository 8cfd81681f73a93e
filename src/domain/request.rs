use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::BloodType;

/// The most units a single request may ask for.
pub const MAX_UNITS: f64 = 10.0;

/// A request for blood posted by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    /// Store-assigned identifier.
    pub id: String,
    /// The user who created, and owns, the request.
    #[serde(alias = "userId")]
    pub requester_user_id: String,
    /// Who the blood is for.
    pub patient_name: String,
    /// Blood type needed.
    pub blood_type: BloodType,
    /// How many units are needed.
    #[serde(alias = "units")]
    pub units_needed: Units,
    /// Where the blood should be delivered.
    pub hospital: String,
    /// Ten-digit contact number.
    pub contact_number: String,
    /// The date by which the blood is needed.
    #[serde(alias = "needBloodBy")]
    pub needed_by_date: NaiveDate,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// How urgent the requester says this is.
    #[serde(default)]
    pub urgency: Urgency,
    /// Server-assigned creation time. Older records may lack one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Optional note from the requester.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BloodRequest {
    /// Whether the request is still open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RequestStatus::Active
    }

    /// Whether `user_id` created this request.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.requester_user_id == user_id
    }

    /// Check whether `actor` may apply `transition`, without applying it.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if `actor` does not own the request or
    /// the request is no longer active.
    pub fn check(&self, actor: &str, transition: Transition) -> Result<(), TransitionError> {
        if !self.is_owned_by(actor) {
            return Err(TransitionError::NotOwner {
                id: self.id.clone(),
                actor: actor.to_string(),
            });
        }
        if !self.is_active() {
            return Err(TransitionError::InvalidStateTransition {
                id: self.id.clone(),
                from: self.status,
                to: transition.target(),
            });
        }
        Ok(())
    }

    /// Apply `transition` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// See [`BloodRequest::check`]. The request is left untouched on error.
    pub fn apply(&mut self, actor: &str, transition: Transition) -> Result<(), TransitionError> {
        self.check(actor, transition)?;
        self.status = transition.target();
        Ok(())
    }

    /// Cancel an active request.
    ///
    /// # Errors
    ///
    /// See [`BloodRequest::check`].
    pub fn cancel(&mut self, actor: &str) -> Result<(), TransitionError> {
        self.apply(actor, Transition::Cancel)
    }

    /// Mark an active request as fulfilled.
    ///
    /// # Errors
    ///
    /// See [`BloodRequest::check`].
    pub fn complete(&mut self, actor: &str) -> Result<(), TransitionError> {
        self.apply(actor, Transition::Complete)
    }
}

/// Lifecycle status of a [`BloodRequest`].
///
/// `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Open and visible to other users.
    #[default]
    Active,
    /// Fulfilled.
    Completed,
    /// Withdrawn by the requester.
    Cancelled,
}

impl RequestStatus {
    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// A change of status a requester can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// active → cancelled
    Cancel,
    /// active → completed
    Complete,
}

impl Transition {
    /// The status the request ends up in.
    #[must_use]
    pub const fn target(self) -> RequestStatus {
        match self {
            Self::Cancel => RequestStatus::Cancelled,
            Self::Complete => RequestStatus::Completed,
        }
    }
}

/// Errors that can occur when changing a request's status.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The request is already in a terminal state.
    #[error("cannot move request {id} from {from} to {to}")]
    InvalidStateTransition {
        /// The request.
        id: String,
        /// Its current status.
        from: RequestStatus,
        /// The status that was asked for.
        to: RequestStatus,
    },

    /// Someone other than the requester tried to change the request.
    #[error("user {actor} does not own request {id}")]
    NotOwner {
        /// The request.
        id: String,
        /// The user who attempted the change.
        actor: String,
    },
}

/// How urgently blood is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// No special urgency.
    #[default]
    Normal,
    /// Needed soon.
    Urgent,
    /// Needed immediately.
    Emergency,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Urgent => "urgent",
            Self::Emergency => "emergency",
        })
    }
}

/// A positive quantity of blood in half-unit steps, at most [`MAX_UNITS`].
///
/// Stored as a count of half units so that equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Units(u8);

impl Units {
    /// Convert a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUnits`] unless `amount` is a multiple of 0.5 in
    /// `(0, 10]`.
    pub fn new(amount: f64) -> Result<Self, InvalidUnits> {
        let halves = amount * 2.0;
        if !(halves.is_finite() && halves.fract() == 0.0 && amount > 0.0 && amount <= MAX_UNITS)
        {
            return Err(InvalidUnits(amount));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let halves = halves as u8;
        Ok(Self(halves))
    }

    /// The amount as a decimal.
    #[must_use]
    pub fn get(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl TryFrom<f64> for Units {
    type Error = InvalidUnits;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Units> for f64 {
    fn from(units: Units) -> Self {
        units.get()
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Error returned for a unit amount outside `(0, 10]` or not in half steps.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Invalid units {0}: must be between 0.5 and 10 in steps of 0.5")]
pub struct InvalidUnits(pub f64);

//! Domain models for the blood donation directory.
//!
//! This module contains the reference data types (donors and blood banks),
//! blood requests and their lifecycle, and the pure functions that filter and
//! match them.

pub mod availability;
pub use availability::{Tier, classify};

mod bank;
pub use bank::{BloodBank, IncompleteInventory, Inventory};

/// Canonical blood types.
pub mod blood_type;
pub use blood_type::BloodType;

mod config;
pub use config::Config;

mod donor;
pub use donor::Donor;

mod draft;
pub use draft::{NewRequest, REQUEST_FIELDS, RequestDraft};

pub mod filter;
pub use filter::{Criteria, Filterable, Selection};

mod location;
pub use location::{EmptyLevelError, Location, LocationRecord};

pub mod matcher;
pub use matcher::{MatchFeed, matchable_requests, own_requests};

mod profile;
pub use profile::{POINTS_PER_DONATION, PROFILE_FIELDS, ProfileDraft, UserProfile};

/// Blood requests and their status transitions.
pub mod request;
pub use request::{BloodRequest, RequestStatus, Transition, TransitionError, Units, Urgency};

pub mod validation;
pub use validation::FieldErrors;

//! Blood donation directory
//!
//! Donors and blood banks are loaded from bundled JSON reference data and
//! narrowed down through a state → district → city hierarchy. Blood requests
//! are matched to other users and move through a small status lifecycle.

pub mod domain;
pub use domain::{
    BloodBank, BloodRequest, BloodType, Config, Criteria, Donor, Inventory, Location,
    LocationRecord, RequestStatus, Tier, classify, matchable_requests,
};

/// Filesystem storage for reference data and blood requests.
pub mod storage;
pub use storage::{Directory, RequestStore};

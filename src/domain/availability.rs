//! Scarcity tiers for blood bank stock levels.

use serde::Serialize;

/// Unit counts at or above this are considered sufficient.
pub const SUFFICIENT_UNITS: u32 = 10;

/// How scarce a blood type is at a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// No units at all.
    Depleted,
    /// Some units, but fewer than [`SUFFICIENT_UNITS`].
    Low,
    /// At least [`SUFFICIENT_UNITS`].
    Sufficient,
}

impl Tier {
    /// Classify a unit count that is already known to be non-negative.
    #[must_use]
    pub const fn of(units: u32) -> Self {
        match units {
            0 => Self::Depleted,
            n if n < SUFFICIENT_UNITS => Self::Low,
            _ => Self::Sufficient,
        }
    }
}

/// Error returned when a unit count is negative.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid unit count {0}: must not be negative")]
pub struct NegativeUnits(pub i64);

/// Classify a unit count into a scarcity tier.
///
/// # Errors
///
/// Returns [`NegativeUnits`] if `units` is below zero.
pub fn classify(units: i64) -> Result<Tier, NegativeUnits> {
    if units < 0 {
        return Err(NegativeUnits(units));
    }
    Ok(u32::try_from(units).map_or(Tier::Sufficient, Tier::of))
}

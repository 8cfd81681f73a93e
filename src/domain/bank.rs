use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{BloodType, Location, LocationRecord, Tier, filter::Filterable};

/// A blood bank from the reference directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodBank {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Postal code.
    pub pincode: String,
    /// Contact number.
    pub phone_number: String,
    /// Free-text opening hours, e.g. "24x7".
    pub operating_hours: String,
    /// Units currently held, per blood type.
    #[serde(rename = "bloodInventory", alias = "inventory")]
    pub inventory: Inventory,
    /// Where the bank is.
    #[serde(flatten)]
    pub location: Location,
}

impl LocationRecord for BloodBank {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

impl Filterable for BloodBank {
    fn offers(&self, blood_type: BloodType) -> bool {
        self.inventory.has_stock(blood_type)
    }
}

/// Unit counts for every canonical blood type.
///
/// Every type always has an entry; a map missing any of them is rejected when
/// deserializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<BloodType, u32>",
    into = "BTreeMap<BloodType, u32>"
)]
pub struct Inventory([u32; 8]);

impl Inventory {
    /// Build an inventory from `(type, units)` pairs, defaulting unmentioned
    /// types to zero.
    #[must_use]
    pub fn from_units(units: impl IntoIterator<Item = (BloodType, u32)>) -> Self {
        let mut inventory = Self::default();
        for (blood_type, count) in units {
            inventory.0[blood_type.index()] = count;
        }
        inventory
    }

    /// Units held for the given type.
    #[must_use]
    pub const fn units(&self, blood_type: BloodType) -> u32 {
        self.0[blood_type.index()]
    }

    /// Whether at least one unit of the given type is held.
    #[must_use]
    pub const fn has_stock(&self, blood_type: BloodType) -> bool {
        self.units(blood_type) > 0
    }

    /// Each blood type with its unit count and scarcity tier, in canonical
    /// order.
    pub fn tiers(&self) -> impl Iterator<Item = (BloodType, u32, Tier)> + '_ {
        BloodType::ALL
            .into_iter()
            .map(|blood_type| {
                let units = self.units(blood_type);
                (blood_type, units, Tier::of(units))
            })
    }

    /// Total units across all types.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&units| u64::from(units)).sum()
    }
}

/// Error returned when an inventory map omits one or more blood types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("inventory is missing blood types: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
pub struct IncompleteInventory(Vec<BloodType>);

impl TryFrom<BTreeMap<BloodType, u32>> for Inventory {
    type Error = IncompleteInventory;

    fn try_from(map: BTreeMap<BloodType, u32>) -> Result<Self, Self::Error> {
        let missing: Vec<_> = BloodType::ALL
            .into_iter()
            .filter(|blood_type| !map.contains_key(blood_type))
            .collect();
        if !missing.is_empty() {
            return Err(IncompleteInventory(missing));
        }
        Ok(Self::from_units(map))
    }
}

impl From<Inventory> for BTreeMap<BloodType, u32> {
    fn from(inventory: Inventory) -> Self {
        BloodType::ALL
            .into_iter()
            .map(|blood_type| (blood_type, inventory.units(blood_type)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_INVENTORY: &str =
        r#"{"A+":3,"A-":0,"B+":12,"B-":1,"AB+":0,"AB-":0,"O+":40,"O-":9}"#;

    #[test]
    fn deserializes_complete_inventory() {
        let inventory: Inventory = serde_json::from_str(FULL_INVENTORY).unwrap();

        assert_eq!(inventory.units(BloodType::BPositive), 12);
        assert_eq!(inventory.units(BloodType::ONegative), 9);
        assert!(!inventory.has_stock(BloodType::ANegative));
        assert_eq!(inventory.total(), 65);
    }

    #[test]
    fn incomplete_inventory_is_rejected() {
        let json = r#"{"A+":3,"A-":0,"B+":12,"B-":1,"AB+":0,"AB-":0,"O+":40}"#;
        let error = serde_json::from_str::<Inventory>(json).unwrap_err();
        assert!(error.to_string().contains("O-"));
    }

    #[test]
    fn negative_counts_are_rejected() {
        let json = r#"{"A+":-3,"A-":0,"B+":12,"B-":1,"AB+":0,"AB-":0,"O+":40,"O-":9}"#;
        assert!(serde_json::from_str::<Inventory>(json).is_err());
    }

    #[test]
    fn tiers_follow_canonical_order() {
        let inventory: Inventory = serde_json::from_str(FULL_INVENTORY).unwrap();
        let tiers: Vec<_> = inventory.tiers().map(|(bt, _, tier)| (bt, tier)).collect();

        assert_eq!(tiers[0], (BloodType::APositive, Tier::Low));
        assert_eq!(tiers[1], (BloodType::ANegative, Tier::Depleted));
        assert_eq!(tiers[2], (BloodType::BPositive, Tier::Sufficient));
        assert_eq!(tiers.len(), 8);
    }

    #[test]
    fn bank_accepts_either_inventory_key() {
        let bank = |key: &str| {
            format!(
                r#"{{"id":"b1","name":"City Bank","address":"1 Main Rd","pincode":"682001",
                "phoneNumber":"0484000000","operatingHours":"24x7","{key}":{FULL_INVENTORY},
                "state":"Kerala","district":"Ernakulam","city":"Kochi"}}"#
            )
        };

        let a: BloodBank = serde_json::from_str(&bank("bloodInventory")).unwrap();
        let b: BloodBank = serde_json::from_str(&bank("inventory")).unwrap();
        assert_eq!(a, b);
        assert!(a.offers(BloodType::OPositive));
        assert!(!a.offers(BloodType::AbPositive));
    }
}

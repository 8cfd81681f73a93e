//! Hierarchical location filtering.
//!
//! The functions here derive the state → district → city hierarchy from a flat
//! list of records and narrow that list down by location and blood type. They
//! are pure: the input slice is never mutated and results preserve the
//! encounter order of the source.
//!
//! An absent or blank constraint means "no constraint", mirroring the "All
//! States" / "All Districts" choices of a picker. A constraint that matches
//! nothing simply produces an empty result.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{BloodType, Location, LocationRecord};

/// A record that can be narrowed down by blood type.
pub trait Filterable: LocationRecord {
    /// Whether this record satisfies a blood type constraint.
    ///
    /// Donors match on their own type; banks match when they hold stock.
    fn offers(&self, blood_type: BloodType) -> bool;
}

impl<T: LocationRecord + ?Sized> LocationRecord for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn location(&self) -> &Location {
        (**self).location()
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn offers(&self, blood_type: BloodType) -> bool {
        (**self).offers(blood_type)
    }
}

/// The active set of filter constraints.
///
/// Changing a level of the location clears the levels below it, so a district
/// selected under one state can never leak into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    state: Option<String>,
    district: Option<String>,
    city: Option<String>,
    blood_type: Option<BloodType>,
}

impl Criteria {
    /// No constraints at all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Criteria::set_state`].
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.set_state(state);
        self
    }

    /// Builder form of [`Criteria::set_district`].
    #[must_use]
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.set_district(district);
        self
    }

    /// Builder form of [`Criteria::set_city`].
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.set_city(city);
        self
    }

    /// Builder form of [`Criteria::set_blood_type`].
    #[must_use]
    pub const fn with_blood_type(mut self, blood_type: Option<BloodType>) -> Self {
        self.blood_type = blood_type;
        self
    }

    /// Select a state. Clears the district and city.
    ///
    /// A blank value removes the state constraint.
    pub fn set_state(&mut self, state: impl Into<String>) {
        self.state = non_blank(state.into());
        self.district = None;
        self.city = None;
    }

    /// Select a district. Clears the city.
    pub fn set_district(&mut self, district: impl Into<String>) {
        self.district = non_blank(district.into());
        self.city = None;
    }

    /// Select a city.
    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = non_blank(city.into());
    }

    /// Select or clear the blood type. Location levels are left untouched.
    pub const fn set_blood_type(&mut self, blood_type: Option<BloodType>) {
        self.blood_type = blood_type;
    }

    /// Drop every constraint.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The selected state, if any.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The selected district, if any.
    #[must_use]
    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    /// The selected city, if any.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// The selected blood type, if any.
    #[must_use]
    pub const fn blood_type(&self) -> Option<BloodType> {
        self.blood_type
    }

    /// Whether a record satisfies every active constraint.
    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        let location = record.location();
        self.state().is_none_or(|s| location.state() == s)
            && self.district().is_none_or(|d| location.district() == d)
            && self.city().is_none_or(|c| location.city() == c)
            && self.blood_type.is_none_or(|bt| record.offers(bt))
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn constraint(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Every state present, sorted and without duplicates.
///
/// Ordering is plain byte-wise string comparison, so it is case-sensitive and
/// not locale-aware.
pub fn states_available<R: LocationRecord>(records: &[R]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.location().state())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Districts found on records in `state`, sorted and without duplicates.
///
/// With no state, every district is returned.
pub fn districts_available<'a, R: LocationRecord>(
    records: &'a [R],
    state: Option<&str>,
) -> Vec<&'a str> {
    let state = constraint(state);
    records
        .iter()
        .map(LocationRecord::location)
        .filter(|location| state.is_none_or(|s| location.state() == s))
        .map(Location::district)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Cities found on records in `state` and `district`, sorted and without
/// duplicates. Whichever constraints are given are applied.
pub fn cities_available<'a, R: LocationRecord>(
    records: &'a [R],
    state: Option<&str>,
    district: Option<&str>,
) -> Vec<&'a str> {
    let state = constraint(state);
    let district = constraint(district);
    records
        .iter()
        .map(LocationRecord::location)
        .filter(|location| state.is_none_or(|s| location.state() == s))
        .filter(|location| district.is_none_or(|d| location.district() == d))
        .map(Location::city)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The records satisfying every constraint in `criteria`, in source order.
pub fn filter<'a, R: Filterable>(records: &'a [R], criteria: &Criteria) -> Vec<&'a R> {
    let matched: Vec<_> = records
        .iter()
        .filter(|record| criteria.matches(*record))
        .collect();
    debug!(
        total = records.len(),
        matched = matched.len(),
        ?criteria,
        "filtered records"
    );
    matched
}

/// A picker session over one collection of records.
///
/// Holds the current [`Criteria`] and derives the option lists and results
/// from it on demand. Nothing is cached: each accessor recomputes from the
/// underlying slice.
#[derive(Debug, Clone)]
pub struct Selection<'a, R> {
    records: &'a [R],
    criteria: Criteria,
}

impl<'a, R: Filterable> Selection<'a, R> {
    /// Start a selection with no constraints.
    #[must_use]
    pub fn new(records: &'a [R]) -> Self {
        Self {
            records,
            criteria: Criteria::default(),
        }
    }

    /// Start a selection from existing criteria.
    #[must_use]
    pub const fn with_criteria(records: &'a [R], criteria: Criteria) -> Self {
        Self { records, criteria }
    }

    /// The active criteria.
    #[must_use]
    pub const fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Mutable access to the active criteria.
    pub const fn criteria_mut(&mut self) -> &mut Criteria {
        &mut self.criteria
    }

    /// States to offer.
    #[must_use]
    pub fn states(&self) -> Vec<&'a str> {
        states_available(self.records)
    }

    /// Districts to offer for the selected state.
    #[must_use]
    pub fn districts(&self) -> Vec<&'a str> {
        districts_available(self.records, self.criteria.state())
    }

    /// Cities to offer for the selected state and district.
    #[must_use]
    pub fn cities(&self) -> Vec<&'a str> {
        cities_available(
            self.records,
            self.criteria.state(),
            self.criteria.district(),
        )
    }

    /// Records matching the active criteria.
    #[must_use]
    pub fn results(&self) -> Vec<&'a R> {
        filter(self.records, &self.criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BloodBank, Donor, Inventory};

    fn donor(id: &str, state: &str, district: &str, city: &str, blood_type: BloodType) -> Donor {
        Donor {
            id: id.to_string(),
            full_name: format!("Donor {id}"),
            blood_type,
            last_donation: None,
            phone_number: "9000000000".to_string(),
            location: Location::new(state, district, city).unwrap(),
        }
    }

    fn bank(id: &str, state: &str, district: &str, city: &str, o_positive: u32) -> BloodBank {
        BloodBank {
            id: id.to_string(),
            name: format!("Bank {id}"),
            address: "1 Hospital Rd".to_string(),
            pincode: "600001".to_string(),
            phone_number: "0440000000".to_string(),
            operating_hours: "24x7".to_string(),
            inventory: Inventory::from_units([(BloodType::OPositive, o_positive)]),
            location: Location::new(state, district, city).unwrap(),
        }
    }

    fn donors() -> Vec<Donor> {
        vec![
            donor("1", "Kerala", "Ernakulam", "Kochi", BloodType::OPositive),
            donor("2", "Tamil Nadu", "Chennai", "Adyar", BloodType::APositive),
            donor("3", "Kerala", "Thrissur", "Chalakudy", BloodType::OPositive),
            donor("4", "Kerala", "Ernakulam", "Aluva", BloodType::BNegative),
            donor("5", "Tamil Nadu", "Coimbatore", "Peelamedu", BloodType::OPositive),
            donor("6", "Kerala", "Ernakulam", "Kochi", BloodType::ANegative),
        ]
    }

    fn ids<R: LocationRecord>(records: &[R]) -> Vec<&str> {
        records.iter().map(LocationRecord::id).collect()
    }

    #[test]
    fn states_are_sorted_and_distinct() {
        assert_eq!(states_available(&donors()), ["Kerala", "Tamil Nadu"]);
    }

    #[test]
    fn states_sort_by_raw_bytes() {
        let records = vec![
            donor("1", "kerala", "D", "C", BloodType::OPositive),
            donor("2", "Punjab", "D", "C", BloodType::OPositive),
            donor("3", "Assam", "D", "C", BloodType::OPositive),
        ];
        assert_eq!(states_available(&records), ["Assam", "Punjab", "kerala"]);
    }

    #[test]
    fn districts_do_not_leak_across_states() {
        let records = donors();
        assert_eq!(
            districts_available(&records, Some("Kerala")),
            ["Ernakulam", "Thrissur"]
        );
        assert_eq!(
            districts_available(&records, Some("Tamil Nadu")),
            ["Chennai", "Coimbatore"]
        );
    }

    #[test]
    fn no_state_offers_every_district() {
        let records = donors();
        let all = ["Chennai", "Coimbatore", "Ernakulam", "Thrissur"];
        assert_eq!(districts_available(&records, None), all);
        assert_eq!(districts_available(&records, Some("")), all);
    }

    #[test]
    fn unknown_state_offers_nothing() {
        assert!(districts_available(&donors(), Some("Goa")).is_empty());
    }

    #[test]
    fn cities_need_both_state_and_district() {
        let records = donors();
        assert_eq!(
            cities_available(&records, Some("Kerala"), Some("Ernakulam")),
            ["Aluva", "Kochi"]
        );
        assert!(cities_available(&records, Some("Tamil Nadu"), Some("Ernakulam")).is_empty());
        assert_eq!(
            cities_available(&records, Some("Kerala"), None),
            ["Aluva", "Chalakudy", "Kochi"]
        );
    }

    #[test]
    fn empty_criteria_keep_everything_in_order() {
        let records = donors();
        let result = filter(&records, &Criteria::new());
        assert_eq!(ids(&result), ["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn constraints_are_combined() {
        let records = donors();
        let criteria = Criteria::new()
            .with_state("Kerala")
            .with_district("Ernakulam")
            .with_blood_type(Some(BloodType::OPositive));
        assert_eq!(ids(&filter(&records, &criteria)), ["1"]);
    }

    #[test]
    fn blood_type_alone_matches_donors_exactly() {
        let records = donors();
        let criteria = Criteria::new().with_blood_type(Some(BloodType::OPositive));
        assert_eq!(ids(&filter(&records, &criteria)), ["1", "3", "5"]);
    }

    #[test]
    fn unknown_city_yields_empty_result() {
        let records = donors();
        let criteria = Criteria::new()
            .with_state("Kerala")
            .with_district("Ernakulam")
            .with_city("Atlantis");
        assert!(filter(&records, &criteria).is_empty());
    }

    #[test]
    fn banks_match_blood_type_on_stock() {
        let banks = vec![
            bank("b1", "X", "D1", "C1", 0),
            bank("b2", "X", "D2", "C2", 12),
        ];
        let criteria = Criteria::new()
            .with_state("X")
            .with_blood_type(Some(BloodType::OPositive));

        assert_eq!(ids(&filter(&banks, &criteria)), ["b2"]);
    }

    #[test]
    fn changing_state_clears_lower_levels() {
        let mut criteria = Criteria::new()
            .with_state("Kerala")
            .with_district("Ernakulam")
            .with_city("Kochi")
            .with_blood_type(Some(BloodType::APositive));

        criteria.set_state("Tamil Nadu");

        assert_eq!(criteria.state(), Some("Tamil Nadu"));
        assert_eq!(criteria.district(), None);
        assert_eq!(criteria.city(), None);
        assert_eq!(criteria.blood_type(), Some(BloodType::APositive));
    }

    #[test]
    fn changing_district_clears_city() {
        let mut criteria = Criteria::new()
            .with_state("Kerala")
            .with_district("Ernakulam")
            .with_city("Kochi");

        criteria.set_district("Thrissur");

        assert_eq!(criteria.state(), Some("Kerala"));
        assert_eq!(criteria.district(), Some("Thrissur"));
        assert_eq!(criteria.city(), None);
    }

    #[test]
    fn blank_values_are_unconstrained() {
        let criteria = Criteria::new().with_state("  ").with_city("");
        assert_eq!(criteria, Criteria::new());
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let records = donors();
        let criteria = Criteria::new()
            .with_state("Kerala")
            .with_blood_type(Some(BloodType::OPositive));

        let once = filter(&records, &criteria);
        let twice = filter(&once, &criteria);

        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn extra_constraints_never_grow_the_result() {
        let records = donors();
        let chain = [
            Criteria::new(),
            Criteria::new().with_state("Kerala"),
            Criteria::new().with_state("Kerala").with_district("Ernakulam"),
            Criteria::new()
                .with_state("Kerala")
                .with_district("Ernakulam")
                .with_city("Kochi"),
            Criteria::new()
                .with_state("Kerala")
                .with_district("Ernakulam")
                .with_city("Kochi")
                .with_blood_type(Some(BloodType::ANegative)),
        ];

        let sizes: Vec<_> = chain.iter().map(|c| filter(&records, c).len()).collect();
        assert_eq!(sizes, [6, 4, 3, 2, 1]);
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn selection_recomputes_options_after_state_change() {
        let records = donors();
        let mut selection = Selection::new(records.as_slice());

        selection.criteria_mut().set_state("Kerala");
        selection.criteria_mut().set_district("Ernakulam");
        assert_eq!(selection.cities(), ["Aluva", "Kochi"]);

        selection.criteria_mut().set_state("Tamil Nadu");
        let districts = selection.districts();
        assert!(!districts.contains(&"Ernakulam"));
        assert_eq!(districts, ["Chennai", "Coimbatore"]);
        assert_eq!(ids(&selection.results()), ["2", "5"]);

        selection.criteria_mut().reset();
        assert_eq!(selection.results().len(), records.len());
    }
}

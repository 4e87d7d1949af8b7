//! In-memory refinement of a fetched page.
//!
//! Applies the criteria whose target fields are nested inside related
//! sub-documents, which the store cannot filter on. All active criteria are
//! AND-ed; inside one list criterion any listed value matches. A listing
//! missing the field a criterion looks at never matches that criterion.

use crate::filters::CarSearchFilters;
use crate::models::{CarListing, CarSpecifications, Reference};

/// Keeps the listings that satisfy every nested-field criterion, in their
/// original order.
pub fn refine(page: Vec<CarListing>, filters: &CarSearchFilters) -> Vec<CarListing> {
    if !has_nested_criteria(filters) {
        return page;
    }
    page.into_iter().filter(|listing| matches(listing, filters)).collect()
}

pub fn has_nested_criteria(filters: &CarSearchFilters) -> bool {
    filters.price_min.is_some()
        || filters.price_max.is_some()
        || filters.mileage_min.is_some()
        || filters.mileage_max.is_some()
        || !filters.models.is_empty()
        || !filters.body_types.is_empty()
        || !filters.colors.is_empty()
        || has_spec_criteria(filters)
}

fn has_spec_criteria(filters: &CarSearchFilters) -> bool {
    !filters.transmissions.is_empty()
        || !filters.fuel_types.is_empty()
        || !filters.doors.is_empty()
        || !filters.seats.is_empty()
        || !filters.safety_ratings.is_empty()
        || filters.mileage_min.is_some()
        || filters.mileage_max.is_some()
}

pub fn matches(listing: &CarListing, filters: &CarSearchFilters) -> bool {
    if has_spec_criteria(filters) {
        let Some(specs) = listing.car_specifications.as_ref() else {
            return false;
        };
        if !matches_specs(specs, filters) {
            return false;
        }
    }

    reference_in(&listing.car_model, &filters.models)
        && reference_in(&listing.body_type, &filters.body_types)
        && reference_in(&listing.color, &filters.colors)
        && within(listing.selling_price(), filters.price_min, filters.price_max)
}

fn matches_specs(specs: &CarSpecifications, filters: &CarSearchFilters) -> bool {
    member_of(specs.transmission_type.as_ref(), &filters.transmissions)
        && member_of(specs.fuel_type.as_ref(), &filters.fuel_types)
        && number_in(specs.doors(), &filters.doors)
        && number_in(specs.seats(), &filters.seats)
        && number_in(specs.safety_rating(), &filters.safety_ratings)
        && within(specs.mileage_value(), filters.mileage_min, filters.mileage_max)
}

// Empty `wanted` is no constraint. Otherwise the value must be present and
// listed; strings compare case-sensitively.
fn member_of<T: PartialEq>(value: Option<&T>, wanted: &[T]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    value.is_some_and(|v| wanted.contains(v))
}

// Numeric list criterion; a value that did not read as a number is absent.
fn number_in<T: Copy + Into<f64>>(value: Option<f64>, wanted: &[T]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    value.is_some_and(|v| wanted.iter().any(|w| (*w).into() == v))
}

fn reference_in(reference: &Option<Reference>, wanted: &[String]) -> bool {
    member_of(reference.as_ref().map(|r| &r.id), wanted)
}

// A missing value never satisfies a bound (a car without a price is not free).
fn within(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(v) = value else {
        return false;
    };
    min.is_none_or(|lo| v >= lo) && max.is_none_or(|hi| v <= hi)
}

//! Native query construction.
//!
//! Turns the part of [`CarSearchFilters`] that the document store can
//! evaluate itself (flat, indexed attributes) into a [`NativeQuery`]. Nested
//! attributes are left for [`crate::refine`], price and mileage ordering for
//! [`crate::order`].

use serde_json::{json, Value};

use crate::filters::{CarSearchFilters, SortBy};

pub const ATTR_STATUS: &str = "status";
pub const ATTR_AVAILABILITY: &str = "availability";
pub const ATTR_CONDITION: &str = "condition";
pub const ATTR_MAKE: &str = "car_make";
pub const ATTR_YEAR: &str = "year";
pub const ATTR_TITLE: &str = "title";
pub const ATTR_CREATED_AT: &str = "$createdAt";

/// A single server-side predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Attribute equals any of `values`.
    Equal { attribute: String, values: Vec<Value> },
    GreaterThanEqual { attribute: String, value: Value },
    LessThanEqual { attribute: String, value: Value },
    /// Full-text match on an indexed attribute.
    Search { attribute: String, text: String },
}

impl Predicate {
    pub fn equal(attribute: &str, values: Vec<Value>) -> Self {
        Predicate::Equal { attribute: attribute.to_string(), values }
    }

    pub fn attribute(&self) -> &str {
        match self {
            Predicate::Equal { attribute, .. }
            | Predicate::GreaterThanEqual { attribute, .. }
            | Predicate::LessThanEqual { attribute, .. }
            | Predicate::Search { attribute, .. } => attribute,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub attribute: String,
    pub direction: Direction,
}

/// `query(collection, predicates, sort?, limit, cursor?)` as the store sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeQuery {
    pub collection: String,
    pub predicates: Vec<Predicate>,
    pub order: Option<OrderBy>,
    pub limit: usize,
    /// Resume after this document id.
    pub cursor: Option<String>,
}

/// Builds the native query for one page. `limit` must already be validated.
pub fn translate(filters: &CarSearchFilters, collection: &str, limit: usize) -> NativeQuery {
    // Drafts and unavailable cars are never search-visible
    let mut predicates = vec![
        Predicate::equal(ATTR_STATUS, vec![json!("published")]),
        Predicate::equal(ATTR_AVAILABILITY, vec![json!(true)]),
    ];

    // Only the title is full-text indexed; make/model/description are not searched
    if let Some(text) = filters.search_text() {
        predicates.push(Predicate::Search {
            attribute: ATTR_TITLE.to_string(),
            text: text.to_string(),
        });
    }

    if !filters.condition.is_empty() {
        let values = filters.condition.iter().map(|c| json!(c.as_str())).collect();
        predicates.push(Predicate::equal(ATTR_CONDITION, values));
    }

    if !filters.makes.is_empty() {
        let values = filters.makes.iter().map(|m| json!(m)).collect();
        predicates.push(Predicate::equal(ATTR_MAKE, values));
    }

    // `year` is a 4-digit string, so a lexicographic range is a numeric range.
    // Validation guarantees the bounds are 4 digits too.
    if let Some(min) = filters.year_min {
        predicates.push(Predicate::GreaterThanEqual {
            attribute: ATTR_YEAR.to_string(),
            value: json!(format!("{:04}", min)),
        });
    }
    if let Some(max) = filters.year_max {
        predicates.push(Predicate::LessThanEqual {
            attribute: ATTR_YEAR.to_string(),
            value: json!(format!("{:04}", max)),
        });
    }

    NativeQuery {
        collection: collection.to_string(),
        predicates,
        order: Some(native_order(filters.sort_by)),
        limit,
        cursor: filters.cursor().map(str::to_string),
    }
}

// Price and mileage can't be ordered by the store; those fetch newest-first
// and get re-sorted in memory.
fn native_order(sort_by: SortBy) -> OrderBy {
    let (attribute, direction) = match sort_by {
        SortBy::YearNew => (ATTR_YEAR, Direction::Desc),
        SortBy::YearOld => (ATTR_YEAR, Direction::Asc),
        SortBy::Newest
        | SortBy::PriceLow
        | SortBy::PriceHigh
        | SortBy::MileageLow
        | SortBy::MileageHigh => (ATTR_CREATED_AT, Direction::Desc),
    };
    OrderBy { attribute: attribute.to_string(), direction }
}

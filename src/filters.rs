// Search criteria received from the browse/search pages

use serde::{Deserialize, Serialize};

use crate::config::SearchSettings;
use crate::error::InvalidFilterError;
use crate::models::Condition;

/// Requested ordering of results.
///
/// `Newest`, `YearNew` and `YearOld` are ordered by the store. Price and
/// mileage orderings are applied in memory to the fetched page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    MileageLow,
    MileageHigh,
    YearNew,
    YearOld,
}

impl SortBy {
    pub fn is_native(&self) -> bool {
        matches!(self, SortBy::Newest | SortBy::YearNew | SortBy::YearOld)
    }
}

/// Every field is optional; an absent field (or an empty list) puts no
/// constraint on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarSearchFilters {
    pub search: Option<String>,

    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub year_min: Option<u32>,
    pub year_max: Option<u32>,
    pub mileage_min: Option<f64>,
    pub mileage_max: Option<f64>,

    pub condition: Vec<Condition>,
    pub makes: Vec<String>,
    pub models: Vec<String>,
    pub body_types: Vec<String>,
    pub transmissions: Vec<String>,
    pub fuel_types: Vec<String>,
    pub colors: Vec<String>,
    pub doors: Vec<u32>,
    pub seats: Vec<u32>,
    pub safety_ratings: Vec<f64>,

    pub sort_by: SortBy,
    pub limit: Option<i64>,
    /// Opaque token from a previous page's `nextCursor`.
    pub cursor: Option<String>,
}

const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1000..=9999;

impl CarSearchFilters {
    /// Search text with surrounding whitespace removed; blank text counts as absent.
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }

    /// Checks the criteria and returns the page size to fetch.
    pub fn validate(&self, settings: &SearchSettings) -> Result<usize, InvalidFilterError> {
        let limit = match self.limit {
            None => settings.default_limit,
            Some(l) if l < 1 => {
                return Err(InvalidFilterError::new("limit", format!("must be a positive integer, got {}", l)));
            }
            Some(l) => {
                let l = usize::try_from(l).unwrap_or(usize::MAX);
                if l > settings.max_limit {
                    return Err(InvalidFilterError::new(
                        "limit",
                        format!("must not exceed {}, got {}", settings.max_limit, l),
                    ));
                }
                l
            }
        };

        check_amount("priceMin", self.price_min)?;
        check_amount("priceMax", self.price_max)?;
        check_range("priceMin", self.price_min, "priceMax", self.price_max)?;

        check_amount("mileageMin", self.mileage_min)?;
        check_amount("mileageMax", self.mileage_max)?;
        check_range("mileageMin", self.mileage_min, "mileageMax", self.mileage_max)?;

        for rating in &self.safety_ratings {
            check_amount("safetyRatings", Some(*rating))?;
        }

        // Years go to the store as fixed-width strings, so they must be 4 digits
        for (field, year) in [("yearMin", self.year_min), ("yearMax", self.year_max)] {
            if let Some(y) = year {
                if !YEAR_RANGE.contains(&y) {
                    return Err(InvalidFilterError::new(field, format!("must be a 4-digit year, got {}", y)));
                }
            }
        }
        check_range("yearMin", self.year_min, "yearMax", self.year_max)?;

        Ok(limit)
    }
}

fn check_amount(field: &'static str, value: Option<f64>) -> Result<(), InvalidFilterError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(InvalidFilterError::new(field, format!("must be a non-negative number, got {}", v)))
        }
        _ => Ok(()),
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    min_field: &'static str,
    min: Option<T>,
    max_field: &'static str,
    max: Option<T>,
) -> Result<(), InvalidFilterError> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(InvalidFilterError::new(
                min_field,
                format!("{} must not exceed {} ({} > {})", min_field, max_field, lo, hi),
            ));
        }
    }
    Ok(())
}

// Listing documents as they come back from the document store, and the page
// shape handed back to callers of a search.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// --- Listing document ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }
}

/// Pointer to another document (make, model, body type, color).
///
/// The store returns relationships either as a bare id string or as the
/// expanded related document; both collapse to the id here. An expanded
/// document without a string `$id` is rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ReferenceRepr")]
pub struct Reference {
    pub id: String,
    pub expanded: Option<Map<String, Value>>,
}

// Written back out in the shape it came in.
impl Serialize for Reference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.expanded {
            Some(doc) => doc.serialize(serializer),
            None => serializer.serialize_str(&self.id),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReferenceRepr {
    Id(String),
    Document(Map<String, Value>),
}

impl TryFrom<ReferenceRepr> for Reference {
    type Error = String;

    fn try_from(repr: ReferenceRepr) -> Result<Self, Self::Error> {
        match repr {
            ReferenceRepr::Id(id) if id.is_empty() => Err("empty reference id".to_string()),
            ReferenceRepr::Id(id) => Ok(Reference { id, expanded: None }),
            ReferenceRepr::Document(doc) => {
                let id = doc
                    .get("$id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| "related document has no $id".to_string())?
                    .to_string();
                Ok(Reference { id, expanded: Some(doc) })
            }
        }
    }
}

// Nested sub-document fields are not queryable, so the store never checks
// their types. A value of the wrong shape reads as absent instead of failing
// the whole page.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

// A JSON number or a numeric string
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

// Numeric fields keep the stored JSON value so responses echo the document
// unchanged; use the accessors to read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingPayments {
    #[serde(default)]
    pub selling_price: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub currency: Option<String>, // e.g. "KES"
}

impl PricingPayments {
    pub fn selling_price(&self) -> Option<f64> {
        number(self.selling_price.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarSpecifications {
    #[serde(default, deserialize_with = "lenient")]
    pub transmission_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub doors: Option<Value>,
    #[serde(default)]
    pub seats: Option<Value>,
    #[serde(default)]
    pub safety_rating: Option<Value>,
    // Usually a numeric string, e.g. "45000"
    #[serde(default)]
    pub mileage: Option<Value>,
}

impl CarSpecifications {
    pub fn doors(&self) -> Option<f64> {
        number(self.doors.as_ref())
    }

    pub fn seats(&self) -> Option<f64> {
        number(self.seats.as_ref())
    }

    pub fn safety_rating(&self) -> Option<f64> {
        number(self.safety_rating.as_ref())
    }

    /// Mileage as a number. Anything that is not a finite, non-negative
    /// number reads as absent.
    pub fn mileage_value(&self) -> Option<f64> {
        number(self.mileage.as_ref()).filter(|m| *m >= 0.0)
    }
}

/// A car listing document. Read-only from the search side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarListing {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    // Flat attributes the store can query natively
    pub status: ListingStatus,
    pub availability: bool,
    pub condition: Condition,
    pub year: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub car_make: Option<Reference>,

    // Nested attributes, only the refiner looks at these
    #[serde(default, deserialize_with = "lenient")]
    pub car_model: Option<Reference>,
    #[serde(default, deserialize_with = "lenient")]
    pub body_type: Option<Reference>,
    #[serde(default, deserialize_with = "lenient")]
    pub pricing_payments: Option<PricingPayments>,
    #[serde(default, deserialize_with = "lenient")]
    pub car_specifications: Option<CarSpecifications>,
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<Reference>,

    // Everything else on the document (description, images, dealer, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CarListing {
    pub fn selling_price(&self) -> Option<f64> {
        self.pricing_payments.as_ref()?.selling_price()
    }

    pub fn mileage(&self) -> Option<f64> {
        self.car_specifications.as_ref()?.mileage_value()
    }
}

// --- Search result page ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Count of documents matching the natively evaluated filters only.
    /// When nested-field filters are active this over-counts.
    pub total: u64,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultPage {
    pub data: Vec<CarListing>,
    pub pagination: Pagination,
}

//! Catalog payload types
//!
//! Listing and detail responses are loosely structured JSON. These types
//! wrap the raw values and expose only the few paths the crawler reads;
//! everything else passes through untouched.

use serde_json::{Map, Value};
use std::fmt;

/// A product summary from the listing endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    fields: Map<String, Value>,
}

impl Product {
    /// Wraps a listing entry. Non-object entries become empty products,
    /// which never resolve to an identifier.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Resolves the product identifier, if any
    ///
    /// Accepts non-zero integers and non-blank strings. Missing ids,
    /// `null`, `0`, `""` and any other JSON type resolve to `None`.
    pub fn id(&self) -> Option<ProductId> {
        match self.fields.get("id")? {
            Value::Number(n) => {
                if let Some(id) = n.as_u64() {
                    (id != 0).then(|| ProductId(id.to_string()))
                } else {
                    n.as_i64().map(|id| ProductId(id.to_string()))
                }
            }
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| ProductId(trimmed.to_string()))
            }
            _ => None,
        }
    }

    /// Looks up any other listing field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Resolved product identifier, kept in its textual URL form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Detail payload for one product
///
/// Opaque apart from `data.product.review`, which the review extractor reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    payload: Value,
}

impl ProductDetail {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// An empty mapping, equivalent to a payload of `{}`
    pub fn empty() -> Self {
        Self {
            payload: Value::Object(Map::new()),
        }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Whether the payload carries a `data.product` object
    pub fn has_product(&self) -> bool {
        self.payload
            .get("data")
            .and_then(|data| data.get("product"))
            .is_some_and(Value::is_object)
    }
}

impl Default for ProductDetail {
    fn default() -> Self {
        Self::empty()
    }
}

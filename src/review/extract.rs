//! Review extraction from product detail payloads
//!
//! The detail payload is walked along `data.product.review`. Missing keys
//! are treated as empty mappings; anything present with an unexpected
//! shape aborts extraction for that product, which then yields an empty
//! review instead of an error.

use crate::catalog::ProductDetail;
use crate::review::normalize::normalize;
use crate::review::{ExtractedReview, ReviewAttribute};
use serde_json::{Map, Value};
use thiserror::Error;

/// Shape mismatch found while walking a detail payload
#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("expected an object at '{path}', found {found}")]
    NotAnObject { path: String, found: &'static str },

    #[error("expected an array at '{path}', found {found}")]
    NotAnArray { path: String, found: &'static str },

    #[error("expected a string at '{path}', found {found}")]
    NotAString { path: String, found: &'static str },
}

/// Extracts the normalized review from a product detail payload
///
/// Never fails: an unexpected payload shape is logged and produces
/// `ExtractedReview::default()`.
///
/// # Example
///
/// ```
/// use review_crawler::{extract_review, ProductDetail};
/// use serde_json::json;
///
/// let detail = ProductDetail::new(json!({
///     "data": {"product": {"review": {
///         "description": "  hi  ",
///         "attributes": [{"title": "Color", "values": ["Red", "Blue"]}]
///     }}}
/// }));
/// let review = extract_review(&detail);
/// assert_eq!(review.description, "hi");
/// assert_eq!(review.attributes, "Color: Red Blue");
/// ```
pub fn extract_review(detail: &ProductDetail) -> ExtractedReview {
    match try_extract_review(detail.payload()) {
        Ok(review) => review,
        Err(e) => {
            tracing::warn!("Error while extracting review: {}", e);
            ExtractedReview::default()
        }
    }
}

/// Strict variant of [`extract_review`] that reports shape mismatches
pub fn try_extract_review(payload: &Value) -> Result<ExtractedReview, ExtractError> {
    let empty = Map::new();

    let root = as_object(payload, "$")?;
    let data = child_object(root, "data", "data")?.unwrap_or(&empty);
    let product = child_object(data, "product", "data.product")?.unwrap_or(&empty);
    let review = child_object(product, "review", "data.product.review")?.unwrap_or(&empty);

    let description = match review.get("description") {
        None => String::new(),
        Some(value) => normalize(as_str(value, "data.product.review.description")?),
    };

    let attributes = match review.get("attributes") {
        None => Vec::new(),
        Some(value) => parse_attributes(value)?,
    };

    Ok(ExtractedReview {
        description,
        attributes: render_attributes(&attributes),
    })
}

/// Parses `review.attributes` into normalized attributes, in source order
fn parse_attributes(value: &Value) -> Result<Vec<ReviewAttribute>, ExtractError> {
    let path = "data.product.review.attributes";
    let entries = value.as_array().ok_or_else(|| ExtractError::NotAnArray {
        path: path.to_string(),
        found: kind(value),
    })?;

    let mut attributes = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let entry_path = format!("{}[{}]", path, index);
        let fields = entry.as_object().ok_or_else(|| ExtractError::NotAnObject {
            path: entry_path.clone(),
            found: kind(entry),
        })?;

        let title = match fields.get("title") {
            None => String::new(),
            Some(title) => normalize(as_str(title, &format!("{}.title", entry_path))?),
        };

        let mut values = Vec::new();
        if let Some(raw_values) = fields.get("values") {
            let values_path = format!("{}.values", entry_path);
            let raw_values = raw_values.as_array().ok_or_else(|| ExtractError::NotAnArray {
                path: values_path.clone(),
                found: kind(raw_values),
            })?;

            for (i, raw) in raw_values.iter().enumerate() {
                let value = normalize(as_str(raw, &format!("{}[{}]", values_path, i))?);
                if !value.is_empty() {
                    values.push(value);
                }
            }
        }

        attributes.push(ReviewAttribute { title, values });
    }

    Ok(attributes)
}

/// Renders attributes as `title: v1 v2` lines
fn render_attributes(attributes: &[ReviewAttribute]) -> String {
    let mut rendered = String::new();
    for attribute in attributes {
        rendered.push_str(&attribute.render());
        rendered.push('\n');
    }
    rendered.trim().to_string()
}

fn child_object<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a Map<String, Value>>, ExtractError> {
    match parent.get(key) {
        None => Ok(None),
        Some(value) => as_object(value, path).map(Some),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ExtractError> {
    value.as_object().ok_or_else(|| ExtractError::NotAnObject {
        path: path.to_string(),
        found: kind(value),
    })
}

fn as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, ExtractError> {
    value.as_str().ok_or_else(|| ExtractError::NotAString {
        path: path.to_string(),
        found: kind(value),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Load payload shape discovery and per-record field completion
//!
//! The remote store has returned several payload shapes over time. Records are
//! located by trying, in order: the payload itself as an array, a `data` array
//! field, the first array-valued top-level field, and finally the payload as a
//! single record object. Every located record then goes through the same
//! field-completion pass.

use serde_json::{Map, Value};

use shared::{component_warn, logging::Component, Investor, InvestorStatus, RecordId};
use crate::error::{BoardError, BoardResult};

pub const UNNAMED: &str = "Unnamed";

/// Where the records were found inside the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadShape {
    Array,
    DataField,
    Field(String),
    SingleRecord,
}

/// Records located in a payload, before field completion
#[derive(Debug, Clone, PartialEq)]
pub struct Located<'a> {
    pub shape: PayloadShape,
    pub items: Vec<&'a Value>,
}

/// Find the record array inside a payload, following the legacy fallback chain
pub fn locate_records(payload: &Value) -> BoardResult<Located<'_>> {
    if let Value::Array(items) = payload {
        return Ok(Located {
            shape: PayloadShape::Array,
            items: items.iter().collect(),
        });
    }

    let Value::Object(object) = payload else {
        return Err(BoardError::format(format!("expected an array or object, got {}", kind_of(payload))));
    };

    if let Some(Value::Array(items)) = object.get("data") {
        return Ok(Located {
            shape: PayloadShape::DataField,
            items: items.iter().collect(),
        });
    }

    if let Some((key, Value::Array(items))) = object.iter().find(|(_, value)| value.is_array()) {
        return Ok(Located {
            shape: PayloadShape::Field(key.clone()),
            items: items.iter().collect(),
        });
    }

    if object.contains_key("id") {
        return Ok(Located {
            shape: PayloadShape::SingleRecord,
            items: vec![payload],
        });
    }

    Err(BoardError::format("object payload without a record array or record id"))
}

/// Locate and complete every record of a payload
///
/// `now` is the timestamp given to records without `createdAt`.
pub fn normalize_payload(payload: &Value, now: &str) -> BoardResult<(PayloadShape, Vec<Investor>)> {
    let located = locate_records(payload)?;
    let records = located
        .items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(fields) => Some(normalize_record(fields, now)),
            other => {
                component_warn!(Component::Sync, "Skipping non-object entry {} in payload: {}", index, kind_of(other));
                None
            }
        })
        .collect();
    Ok((located.shape, records))
}

/// Complete a single loaded record, defaulting every missing field
pub fn normalize_record(fields: &Map<String, Value>, now: &str) -> Investor {
    let id = text_field(fields, "id")
        .map(RecordId::from)
        .unwrap_or_else(RecordId::generate);
    let name = text_field(fields, "name").unwrap_or_else(|| UNNAMED.to_string());
    let status = text_field(fields, "status")
        .and_then(|label| label.parse::<InvestorStatus>().ok())
        .unwrap_or_else(InvestorStatus::first);
    let created_at = text_field(fields, "createdAt").unwrap_or_else(|| now.to_string());

    Investor {
        id,
        name,
        kind: text_field(fields, "type").unwrap_or_default(),
        description: text_field(fields, "description").unwrap_or_default(),
        status,
        investment_min: fields.get("investmentMin").and_then(unwrap_amount),
        investment_max: fields.get("investmentMax").and_then(unwrap_amount),
        created_at,
        email: text_field(fields, "email").unwrap_or_default(),
        linkedin: text_field(fields, "linkedin").unwrap_or_default(),
    }
}

/// Accept a plain number, a `{ "_type": "undefined" }` marker or a `{ "value": .. }` wrapper
pub fn unwrap_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Object(wrapper) => {
            if wrapper.get("_type").and_then(Value::as_str) == Some("undefined") {
                return None;
            }
            match wrapper.get("value")? {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => parse_amount(text),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Non-empty string form of a field; scalars are stringified
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match fields.get(key)? {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

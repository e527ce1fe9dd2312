use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::record::{article_is_well_formed, InvoiceRecord};

#[derive(Debug)]
pub enum ParseError {
    /// The file is not syntactically valid JSON.
    Json(serde_json::Error),
    /// The top-level JSON value is not an array.
    NotAnArray,
    /// No record survived structural validation.
    NoRecords,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON: {}", err),
            Self::NotAnArray => write!(f, "ledger document is not a JSON array"),
            Self::NoRecords => write!(f, "ledger contains no structurally valid records"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parse raw ledger bytes into invoice records.
///
/// Individual records failing a structural constraint are dropped, not
/// fatal: the surrounding document still loads so a reviewer can inspect
/// whatever survives. Document-level problems (not JSON, not an array,
/// nothing survives) are errors.
pub fn parse_ledger(data: &[u8]) -> Result<Vec<InvoiceRecord>, ParseError> {
    let document: Value = serde_json::from_slice(data)?;
    let Some(elements) = document.as_array() else {
        return Err(ParseError::NotAnArray);
    };

    let mut records = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match validate_element(element) {
            Ok(record) => records.push(record),
            Err(reason) => {
                debug!(index, reason, "dropping malformed ledger record");
            }
        }
    }

    debug!(parsed = records.len(), total = elements.len(), "ledger parsed");
    if records.is_empty() {
        return Err(ParseError::NoRecords);
    }
    Ok(records)
}

fn validate_element(element: &Value) -> Result<InvoiceRecord, &'static str> {
    let Some(obj) = element.as_object() else {
        return Err("element is not an object");
    };

    let article = obj
        .get("article")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !article_is_well_formed(article) {
        return Err("article is not a 10-digit code");
    }

    let quantity = obj
        .get("quantity")
        .and_then(as_integral)
        .unwrap_or_default();
    if quantity <= 0 || quantity > i64::from(u32::MAX) {
        return Err("quantity is not a positive integer");
    }

    let timestamp = obj
        .get("timestamp")
        .and_then(as_integral)
        .unwrap_or_default();
    if timestamp <= 0 {
        return Err("timestamp is not a positive epoch second");
    }

    let hash = obj.get("hash").and_then(Value::as_str).unwrap_or_default();
    if hash.is_empty() {
        return Err("hash is missing or empty");
    }

    Ok(InvoiceRecord::new(
        article.to_string(),
        quantity as u32,
        timestamp,
        hash.to_string(),
    ))
}

/// Numeric field extraction. Legacy exporters render whole numbers with
/// a trailing `.0`, so a float with zero fraction counts as its integer;
/// fractional values stay `None` and the record drops.
fn as_integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Some(f as i64);
    }
    None
}

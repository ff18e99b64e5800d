//! Expense payload validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. every required field is present and non-blank (all missing fields are
//!    reported together)
//! 2. `amount` parses as a number that fits the decimal range
//! 3. `amount` is strictly positive
//! 4. `date` parses as a calendar date
//!
//! On success the parsed, normalized values are returned so callers never
//! parse the payload twice.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::models::ExpensePayload;
use crate::types::ExpenseField;

pub const MSG_INVALID_AMOUNT: &str = "El monto debe ser un número válido";
pub const MSG_AMOUNT_OUT_OF_RANGE: &str = "El monto está fuera del rango permitido";
pub const MSG_NON_POSITIVE_AMOUNT: &str = "El monto debe ser mayor a 0";
pub const MSG_INVALID_DATE: &str = "La fecha debe ser válida";

/// Validated and normalized expense fields
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
}

/// Validate a payload, returning its normalized fields
pub fn validate_expense(payload: &ExpensePayload) -> CoreResult<ExpenseFields> {
    let missing: Vec<&str> = ExpenseField::REQUIRED
        .iter()
        .filter(|field| is_blank(**field, payload.get(**field)))
        .map(|field| field.as_str())
        .collect();

    if !missing.is_empty() {
        return Err(CoreError::validation(format!(
            "Campos requeridos faltantes: {}",
            missing.join(", ")
        )));
    }

    let amount = match payload.amount.as_ref() {
        Some(value) => parse_amount(value)?,
        None => return Err(CoreError::validation(MSG_INVALID_AMOUNT)),
    };
    if amount <= Decimal::ZERO {
        return Err(CoreError::validation(MSG_NON_POSITIVE_AMOUNT));
    }

    let date = payload
        .date
        .as_ref()
        .and_then(text_value)
        .and_then(|raw| parse_date(&raw))
        .ok_or_else(|| CoreError::validation(MSG_INVALID_DATE))?;

    Ok(ExpenseFields {
        description: payload.description.as_ref().and_then(text_value).unwrap_or_default(),
        amount,
        category: payload.category.as_ref().and_then(text_value).unwrap_or_default(),
        date,
    })
}

/// Trimmed text of a string or number value
fn text_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Absent, null or whitespace-only. Text fields also treat booleans,
/// arrays and objects as absent; for `amount` those are a number error.
fn is_blank(field: ExpenseField, value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.trim().is_empty(),
        Some(serde_json::Value::Number(_)) => false,
        Some(_) => field != ExpenseField::Amount,
    }
}

/// Parse an amount from a JSON number or numeric string
///
/// Numbers that are well formed but too large, or too precise, for a
/// `Decimal` are reported as out of range rather than invalid.
pub fn parse_amount(value: &serde_json::Value) -> CoreResult<Decimal> {
    let raw = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return Err(CoreError::validation(MSG_INVALID_AMOUNT)),
    };

    if let Ok(amount) = Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)) {
        return Ok(amount);
    }

    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Err(CoreError::validation(MSG_AMOUNT_OUT_OF_RANGE)),
        _ => Err(CoreError::validation(MSG_INVALID_AMOUNT)),
    }
}

/// Parse a calendar date, discarding any time component
///
/// Accepts `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM[:SS]` date-times and
/// RFC 3339 timestamps. Timestamps with an offset are converted to UTC
/// before the date is taken.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    None
}

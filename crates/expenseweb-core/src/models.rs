//! Core data models for expenses

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::ExpenseField;

/// A single recorded spending event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Opaque identifier, fixed at creation
    pub id: String,
    /// What the money was spent on (trimmed, non-empty)
    pub description: String,
    /// Amount spent, always positive
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Free-form grouping label (trimmed, non-empty)
    pub category: String,
    /// Calendar day of the expense, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Timestamp of the last update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// Key used to order listings: `createdAt`, else midnight UTC of `date`
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
            .unwrap_or_else(|| self.date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

/// Raw expense fields as submitted by a caller
///
/// Values are kept as JSON so validation can tell a missing field from a
/// malformed one and report each precisely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpensePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<serde_json::Value>,
}

impl ExpensePayload {
    /// Build a well-formed payload from typed values
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            description: Some(serde_json::Value::String(description.into())),
            amount: Some(amount_to_json(amount)),
            date: Some(serde_json::Value::String(date.format("%Y-%m-%d").to_string())),
            category: Some(serde_json::Value::String(category.into())),
        }
    }

    /// Replace the amount
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount_to_json(amount));
        self
    }

    /// Submitted value for a field, if any
    pub fn get(&self, field: ExpenseField) -> Option<&serde_json::Value> {
        match field {
            ExpenseField::Description => self.description.as_ref(),
            ExpenseField::Amount => self.amount.as_ref(),
            ExpenseField::Date => self.date.as_ref(),
            ExpenseField::Category => self.category.as_ref(),
        }
    }
}

impl From<&Expense> for ExpensePayload {
    fn from(expense: &Expense) -> Self {
        ExpensePayload::new(
            expense.description.clone(),
            expense.amount,
            expense.category.clone(),
            expense.date,
        )
    }
}

/// Amounts travel as JSON numbers; fall back to text if not representable
fn amount_to_json(amount: Decimal) -> serde_json::Value {
    amount
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(amount.to_string()))
}

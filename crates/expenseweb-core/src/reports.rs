//! Aggregate figures over the stored expenses

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::Expense;

/// Total, count and average of all expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub count: usize,
    /// Zero when there are no expenses
    #[serde(with = "rust_decimal::serde::float")]
    pub average: Decimal,
}

impl ExpenseSummary {
    /// Aggregate `expenses`
    ///
    /// Fails when the running total leaves the range `Decimal` can hold.
    pub fn from_expenses<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> CoreResult<Self> {
        let (total, count) = expenses.into_iter().try_fold(
            (Decimal::ZERO, 0usize),
            |(total, count), e| {
                total
                    .checked_add(e.amount)
                    .map(|total| (total, count + 1))
                    .ok_or_else(|| CoreError::InternalError {
                        message: format!("expense total overflows after {} records", count),
                    })
            },
        )?;

        let average = if count == 0 {
            Decimal::ZERO
        } else {
            (total / Decimal::from(count)).round_dp(2)
        };

        Ok(Self { total, count, average })
    }
}

//! Expense controller: the List/Create/Update/Delete business rules
//!
//! The controller owns the [`ExpenseStore`] it is given and is the only code
//! that mutates it. Callers share one controller behind a lock so that every
//! operation runs to completion before the next one starts.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::models::{Expense, ExpensePayload};
use crate::reports::ExpenseSummary;
use crate::store::ExpenseStore;
use crate::time::{Clock, SystemClock};
use crate::validation::validate_expense;

/// Clock reference type
pub type ClockRef = Arc<dyn Clock>;

pub struct ExpenseController {
    store: ExpenseStore,
    clock: ClockRef,
}

impl Default for ExpenseController {
    fn default() -> Self {
        Self::new(ExpenseStore::new(), Arc::new(SystemClock))
    }
}

impl ExpenseController {
    /// Create a controller over a store, stamping records with `clock`
    pub fn new(store: ExpenseStore, clock: ClockRef) -> Self {
        Self { store, clock }
    }

    /// All expenses, newest `createdAt` first
    ///
    /// Records without `createdAt` are ordered by their `date`. The sort is
    /// stable, so equal keys keep insertion order.
    pub fn list(&self) -> Vec<Expense> {
        let mut expenses = self.store.snapshot();
        expenses.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        expenses
    }

    /// Validate a payload and store it as a new expense
    pub fn create(&mut self, payload: &ExpensePayload) -> CoreResult<Expense> {
        let fields = validate_expense(payload).map_err(|e| {
            log::warn!("Rejected new expense: {}", e);
            e
        })?;

        let expense = Expense {
            id: self.unique_id(),
            description: fields.description,
            amount: fields.amount,
            category: fields.category,
            date: fields.date,
            created_at: Some(self.clock.now()),
            updated_at: None,
        };

        self.store.append(expense.clone());
        log::info!(
            "Expense created: id={} amount={} category={}",
            expense.id,
            expenseweb_utils::format_amount(expense.amount),
            expense.category
        );

        Ok(expense)
    }

    /// Overwrite the fields of an existing expense
    ///
    /// `id` and `createdAt` always come from the stored record.
    pub fn update(&mut self, id: &str, payload: &ExpensePayload) -> CoreResult<Expense> {
        let fields = validate_expense(payload).map_err(|e| {
            log::warn!("Rejected update for expense {}: {}", id, e);
            e
        })?;

        let existing = self
            .store
            .find(id)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;

        let updated = Expense {
            id: existing.id.clone(),
            description: fields.description,
            amount: fields.amount,
            category: fields.category,
            date: fields.date,
            created_at: existing.created_at,
            updated_at: Some(self.clock.now()),
        };

        self.store
            .replace(updated.clone())
            .ok_or_else(|| CoreError::InternalError {
                message: format!("expense {} vanished during update", id),
            })?;
        log::info!("Expense updated: id={}", id);

        Ok(updated)
    }

    /// Remove an expense
    pub fn delete(&mut self, id: &str) -> CoreResult<()> {
        self.store
            .remove(id)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
        log::info!("Expense deleted: id={}", id);
        if self.store.is_empty() {
            log::debug!("Expense store is now empty");
        }
        Ok(())
    }

    /// Total, count and average over every expense
    pub fn summary(&self) -> CoreResult<ExpenseSummary> {
        ExpenseSummary::from_expenses(self.store.iter())
    }

    /// Number of stored expenses
    pub fn count(&self) -> usize {
        self.store.len()
    }

    fn unique_id(&self) -> String {
        loop {
            let id = expenseweb_utils::generate_id();
            if self.store.find(&id).is_none() {
                return id;
            }
        }
    }
}

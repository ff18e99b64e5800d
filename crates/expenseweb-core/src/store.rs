//! In-memory expense store
//!
//! Records are kept in creation order. Lookups are linear scans on `id`;
//! a missing id is reported as `None`, never as an error.

use crate::models::Expense;

#[derive(Debug, Default)]
pub struct ExpenseStore {
    expenses: Vec<Expense>,
}

impl ExpenseStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the end of the collection
    pub fn append(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    /// Find a record by id
    pub fn find(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Replace the record with the same id, returning the previous one
    pub fn replace(&mut self, expense: Expense) -> Option<Expense> {
        let slot = self.expenses.iter_mut().find(|e| e.id == expense.id)?;
        Some(std::mem::replace(slot, expense))
    }

    /// Remove a record by id, returning it
    pub fn remove(&mut self, id: &str) -> Option<Expense> {
        let index = self.expenses.iter().position(|e| e.id == id)?;
        Some(self.expenses.remove(index))
    }

    /// Copy of every record, in creation order
    pub fn snapshot(&self) -> Vec<Expense> {
        self.expenses.clone()
    }

    /// Borrowing view of every record, in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

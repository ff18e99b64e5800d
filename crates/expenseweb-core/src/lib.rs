//! Core expense tracking and business logic
//!
//! - [`validation`]: payload checks and normalization
//! - [`store`]: the in-memory record collection
//! - [`controller`]: List/Create/Update/Delete over the store
//! - [`reports`]: total, count and average figures

pub mod controller;
pub mod error;
pub mod models;
pub mod reports;
pub mod store;
pub mod time;
pub mod types;
pub mod validation;

pub use controller::{ClockRef, ExpenseController};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use models::{Expense, ExpensePayload};
pub use reports::ExpenseSummary;
pub use store::ExpenseStore;
pub use time::{Clock, ManualClock, SystemClock};
pub use types::ExpenseField;
pub use validation::{validate_expense, ExpenseFields};

//! Expense routes
//!
//! Structure:
//! - api.rs: JSON API endpoints

pub mod api;

pub use api::{
    api_create_expense,
    api_delete_expense,
    api_expense_summary,
    api_expenses,
    api_update_expense,
};

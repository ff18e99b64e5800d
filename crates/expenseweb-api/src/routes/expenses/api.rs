//! Expenses API endpoints - JSON API
//!
//! Endpoints:
//! - api_expenses: List expenses, newest first
//! - api_create_expense: Create an expense (201)
//! - api_update_expense: Update an expense by id
//! - api_delete_expense: Delete an expense by id (204)
//! - api_expense_summary: Total, count and average

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use expenseweb_core::{ErrorContext, Expense, ExpensePayload, ExpenseSummary};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::AppState;

/// Get all expenses (JSON API)
pub async fn api_expenses(state: State<AppState>) -> Json<Vec<Expense>> {
    let controller = state.controller.read().await;
    Json(controller.list())
}

/// Create a new expense (JSON API)
pub async fn api_create_expense(
    state: State<AppState>,
    JsonBody(payload): JsonBody<ExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let mut controller = state.controller.write().await;
    let expense = controller
        .create(&payload)
        .map_err(|e| ApiError::from_core(e, ErrorContext::new("create_expense")))?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// Update an existing expense (JSON API)
pub async fn api_update_expense(
    state: State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ExpensePayload>,
) -> Result<Json<Expense>, ApiError> {
    let mut controller = state.controller.write().await;
    let expense = controller
        .update(&id, &payload)
        .map_err(|e| ApiError::from_core(e, expense_context("update_expense", &id)))?;
    Ok(Json(expense))
}

/// Delete an expense (JSON API)
pub async fn api_delete_expense(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut controller = state.controller.write().await;
    controller
        .delete(&id)
        .map_err(|e| ApiError::from_core(e, expense_context("delete_expense", &id)))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Aggregate figures (JSON API)
pub async fn api_expense_summary(state: State<AppState>) -> Result<Json<ExpenseSummary>, ApiError> {
    let controller = state.controller.read().await;
    let summary = controller
        .summary()
        .map_err(|e| ApiError::from_core(e, ErrorContext::new("expense_summary")))?;
    Ok(Json(summary))
}

fn expense_context(operation: &str, id: &str) -> ErrorContext {
    ErrorContext::new(operation).with_data("id", serde_json::json!(id))
}

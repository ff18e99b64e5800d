//! Route modules for the API server
//!
//! - expenses: the expense resource (list, create, update, delete, summary)

pub mod expenses;

use crate::error::ApiError;

/// Fallback for unknown paths and unsupported methods
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

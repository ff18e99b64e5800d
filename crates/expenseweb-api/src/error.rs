//! Error types for expenseweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use expenseweb_core::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("JSON mal formado")]
    MalformedJson,

    #[error("Ruta no encontrada")]
    RouteNotFound,

    #[error("Error interno del servidor")]
    InternalError,
}

impl ApiError {
    /// Map a core error, logging it with the context of the failed request
    pub fn from_core(error: CoreError, context: ErrorContext) -> Self {
        DefaultErrorLogger.log_error(&error, &context);
        match error {
            CoreError::ValidationError { message } => ApiError::BadRequest { message },
            CoreError::NotFound { .. } => ApiError::NotFound {
                message: error.to_string(),
            },
            CoreError::InternalError { .. } => ApiError::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } | ApiError::MalformedJson => StatusCode::BAD_REQUEST,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Failures that stop the server from running
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Port {port} is already in use on {host}. Try another port.")]
    AddressInUse { host: String, port: u16 },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

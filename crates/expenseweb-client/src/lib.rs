//! HTTP client for the expense API
//!
//! Thin adapter used by front ends and scripts. Every call maps a non-2xx
//! answer to [`ClientError::Api`], carrying the server's `error` message when
//! the body has one and a per-operation fallback otherwise.

use expenseweb_core::{Expense, ExpensePayload, ExpenseSummary};
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Where the server listens by default
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

const FETCH_FAILED: &str = "Error al obtener los gastos";
const ADD_FAILED: &str = "Error al agregar el gasto";
const UPDATE_FAILED: &str = "Error al actualizar el gasto";
const DELETE_FAILED: &str = "No se pudo eliminar el gasto";
const SUMMARY_FAILED: &str = "Error al obtener el resumen";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),

    #[error("Request failed: {0}")]
    Request(#[from] hyper::Error),

    #[error("Failed to build request: {0}")]
    Http(#[from] hyper::http::Error),

    /// The server answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client bound to one server
#[derive(Clone, Debug)]
pub struct ExpenseClient {
    base_url: String,
    http: Client<HttpConnector>,
}

impl Default for ExpenseClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ExpenseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All expenses, newest first
    pub async fn fetch_expenses(&self) -> ClientResult<Vec<Expense>> {
        let (status, body) = self.send(Method::GET, "/expenses", None).await?;
        decode(status, &body, FETCH_FAILED)
    }

    /// Create an expense and return the stored record
    pub async fn add_expense(&self, payload: &ExpensePayload) -> ClientResult<Expense> {
        let body = serde_json::to_vec(payload)?;
        let (status, body) = self.send(Method::POST, "/expenses", Some(body)).await?;
        decode(status, &body, ADD_FAILED)
    }

    /// Replace the fields of an existing expense
    pub async fn update_expense(&self, id: &str, payload: &ExpensePayload) -> ClientResult<Expense> {
        let body = serde_json::to_vec(payload)?;
        let path = format!("/expenses/{}", id);
        let (status, body) = self.send(Method::PUT, &path, Some(body)).await?;
        decode(status, &body, UPDATE_FAILED)
    }

    pub async fn delete_expense(&self, id: &str) -> ClientResult<()> {
        let path = format!("/expenses/{}", id);
        let (status, body) = self.send(Method::DELETE, &path, None).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status, &body, DELETE_FAILED))
        }
    }

    /// Total, count and average
    pub async fn fetch_summary(&self) -> ClientResult<ExpenseSummary> {
        let (status, body) = self.send(Method::GET, "/expenses/summary", None).await?;
        decode(status, &body, SUMMARY_FAILED)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> ClientResult<(StatusCode, Bytes)> {
        let uri: Uri = format!("{}{}", self.base_url, path).parse()?;
        log::debug!("{} {}", method, uri);

        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        let request = builder.body(body)?;

        let response = self.http.request(request).await?;
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await?;
        Ok((status, bytes))
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8], fallback: &str) -> ClientResult<T> {
    if !status.is_success() {
        return Err(api_error(status, body, fallback));
    }
    Ok(serde_json::from_slice(body)?)
}

fn api_error(status: StatusCode, body: &[u8], fallback: &str) -> ClientError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    log::warn!("Request failed with {}: {}", status, message);
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

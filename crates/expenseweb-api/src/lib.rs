//! HTTP API server for expense records
//!
//! Routes are organized into modules:
//! - routes::expenses: Expense list, create, update, delete, summary
//!
//! Every error is answered as JSON `{"error": "<message>"}`. Handler panics
//! are caught and answered with a generic 500.

pub mod error;
pub mod extract;
pub mod routes;

use axum::{
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use expenseweb_config::Config;
use expenseweb_core::ExpenseController;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use error::{ApiError, ServerError};

/// Text served at `/`
pub const WELCOME_MESSAGE: &str = "¡Bienvenido al backend de gastos personales!";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RwLock<ExpenseController>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, controller: ExpenseController) -> Self {
        Self {
            controller: Arc::new(RwLock::new(controller)),
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::expenses::{
        api_create_expense, api_delete_expense, api_expense_summary, api_expenses,
        api_update_expense,
    };
    use routes::route_not_found;

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(welcome).fallback(route_not_found))
        .route("/health", get(health_check).fallback(route_not_found))
        // Expense resource
        .route(
            "/expenses",
            get(api_expenses).post(api_create_expense).fallback(route_not_found),
        )
        .route(
            "/expenses/summary",
            get(api_expense_summary).fallback(route_not_found),
        )
        .route(
            "/expenses/:id",
            put(api_update_expense).delete(api_delete_expense).fallback(route_not_found),
        )
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .with_state(state)
}

/// CORS policy: configured origins, CRUD methods, `Content-Type` only
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Turn a handler panic into the generic 500 response
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    log::error!("Request handler panicked: {}", detail);
    ApiError::InternalError.into_response()
}

/// Welcome text
async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until SIGINT or SIGTERM,
/// then lets in-flight requests finish before returning.
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `controller` - The expense controller, owning the store
pub async fn start_server(config: Config, controller: ExpenseController) -> Result<(), ServerError> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            ServerError::AddressInUse {
                host: config.server.host.clone(),
                port: config.server.port,
            }
        } else {
            ServerError::Bind {
                addr: addr.clone(),
                source: e,
            }
        }
    })?;

    log::info!("Starting expenseweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - GET    /");
    log::info!("  - GET    /expenses");
    log::info!("  - POST   /expenses");
    log::info!("  - PUT    /expenses/:id");
    log::info!("  - DELETE /expenses/:id");
    log::info!("  - GET    /expenses/summary");

    let state = AppState::new(config, controller);
    serve(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, closing server...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, TimeZone, Utc};
    use expenseweb_core::{ExpenseStore, ManualClock};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let controller = ExpenseController::new(
            ExpenseStore::new(),
            Arc::new(ManualClock::stepping(start, Duration::seconds(1))),
        );
        create_router(AppState::new(Config::default(), controller))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let (status, _, bytes) = send(router, request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };
        (status, value)
    }

    async fn create(router: &Router, description: &str, amount: Value, date: &str) -> Value {
        let body = json!({
            "description": description,
            "amount": amount,
            "date": date,
            "category": "General"
        });
        let (status, value) = call(router, "POST", "/expenses", Some(&body.to_string())).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", value);
        value
    }

    #[tokio::test]
    async fn test_welcome_and_health() {
        let router = test_router();
        let (status, body) = call(&router, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String(WELCOME_MESSAGE.to_string()));

        let (status, body) = call(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".to_string()));
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let router = test_router();
        let created = create(&router, "  Cinema ", json!("15.50"), "2024-05-20").await;

        assert_eq!(created["description"], "Cinema");
        assert_eq!(created["amount"], 15.5);
        assert_eq!(created["date"], "2024-05-20");
        assert_eq!(created["category"], "General");
        assert!(created["id"].is_string());
        assert!(created["createdAt"].is_string());
        assert!(created.get("updatedAt").is_none());

        let (status, list) = call(&router, "GET", "/expenses", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([created]));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let router = test_router();
        for date in ["2024-01-01", "2024-03-01", "2024-02-01"] {
            create(&router, "Item", json!(10), date).await;
        }

        let (_, list) = call(&router, "GET", "/expenses", None).await;
        let dates: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-02-01", "2024-03-01", "2024-01-01"]);
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let router = test_router();

        let body = json!({"description": "Taxi", "amount": "abc", "date": "2024-01-01", "category": "Transport"});
        let (status, value) = call(&router, "POST", "/expenses", Some(&body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({"error": "El monto debe ser un número válido"}));

        let body = json!({"description": "Taxi", "amount": -5, "date": "2024-01-01", "category": "Transport"});
        let (status, value) = call(&router, "POST", "/expenses", Some(&body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({"error": "El monto debe ser mayor a 0"}));

        let (status, value) = call(&router, "POST", "/expenses", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            value,
            json!({"error": "Campos requeridos faltantes: description, amount, date, category"})
        );

        let (_, list) = call(&router, "GET", "/expenses", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let router = test_router();
        let (status, value) = call(&router, "POST", "/expenses", Some("{\"description\": ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({"error": "JSON mal formado"}));

        let (status, value) = call(&router, "PUT", "/expenses/any", Some("[1, 2")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({"error": "JSON mal formado"}));
    }

    #[tokio::test]
    async fn test_update_expense() {
        let router = test_router();
        let created = create(&router, "Book", json!(20), "2024-01-10").await;
        let id = created["id"].as_str().unwrap();

        let mut edit = created.clone();
        edit["amount"] = json!(25.99);
        let (status, updated) = call(&router, "PUT", &format!("/expenses/{}", id), Some(&edit.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["description"], "Book");
        assert_eq!(updated["date"], "2024-01-10");
        assert_eq!(updated["amount"], 25.99);
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert!(updated["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_update_missing_expense() {
        let router = test_router();
        let body = json!({"description": "X", "amount": 1, "date": "2024-01-01", "category": "Y"});
        let (status, value) = call(&router, "PUT", "/expenses/missing", Some(&body.to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({"error": "Gasto no encontrado"}));
    }

    #[tokio::test]
    async fn test_delete_expense() {
        let router = test_router();
        let created = create(&router, "Snack", json!(3), "2024-01-01").await;
        let uri = format!("/expenses/{}", created["id"].as_str().unwrap());

        let (status, body) = call(&router, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (_, list) = call(&router, "GET", "/expenses", None).await;
        assert_eq!(list, json!([]));

        let (status, value) = call(&router, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({"error": "Gasto no encontrado"}));
    }

    #[tokio::test]
    async fn test_summary() {
        let router = test_router();
        create(&router, "A", json!(10), "2024-01-01").await;
        create(&router, "B", json!(30), "2024-01-02").await;

        let (status, summary) = call(&router, "GET", "/expenses/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["count"], 2);
        assert_eq!(summary["total"], 40.0);
        assert_eq!(summary["average"], 20.0);
    }

    #[tokio::test]
    async fn test_summary_overflow_is_internal_error() {
        let router = test_router();
        create(&router, "A", json!("50000000000000000000000000000"), "2024-01-01").await;
        create(&router, "B", json!("50000000000000000000000000000"), "2024-01-02").await;

        let (status, value) = call(&router, "GET", "/expenses/summary", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value, json!({"error": "Error interno del servidor"}));

        let (status, _) = call(&router, "GET", "/expenses", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_object_bodies_are_empty_payloads() {
        let router = test_router();
        let missing = json!({"error": "Campos requeridos faltantes: description, amount, date, category"});

        for body in [r#"["Taxi", 5, "2024-01-01", "Transport"]"#, "42", "\"Taxi\"", "null"] {
            let (status, value) = call(&router, "POST", "/expenses", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(value, missing, "body: {}", body);
        }

        let (_, list) = call(&router, "GET", "/expenses", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_routes() {
        let router = test_router();
        let (status, value) = call(&router, "GET", "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({"error": "Ruta no encontrada"}));

        let (status, value) = call(&router, "PATCH", "/expenses", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({"error": "Ruta no encontrada"}));

        let (status, value) = call(&router, "GET", "/expenses/some-id", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({"error": "Ruta no encontrada"}));
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let router = test_router();
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/expenses")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        let methods = headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        for method in ["GET", "POST", "PUT", "DELETE"] {
            assert!(methods.contains(method), "missing {} in {}", method, methods);
        }
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let router = test_router();
        let request = Request::builder()
            .method("GET")
            .uri("/expenses")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"error": "Error interno del servidor"}));
    }

    #[tokio::test]
    async fn test_start_server_reports_port_in_use() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;

        let result = start_server(config, ExpenseController::default()).await;
        match result {
            Err(ServerError::AddressInUse { port: reported, .. }) => assert_eq!(reported, port),
            other => panic!("expected AddressInUse, got {:?}", other.map(|_| ())),
        }
    }
}

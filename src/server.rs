use axum::{
    routing::{get, post},
    Router, Json,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    extract::State,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::attendance::parse_punch_log;
use crate::config::AppConfig;
use crate::error::{DtrError, DtrResult};
use crate::render::{render, OutputFormat};
use crate::request::DtrRequest;

/// Shared application state (immutable configuration)
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
}

/// Error response
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Employee ids found in an uploaded punch log
#[derive(Serialize, Deserialize)]
pub struct EmployeeIdsResponse {
    pub employee_ids: Vec<String>,
    pub skipped_lines: usize,
}

pub fn router(config: AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/dtr/pdf", post(generate_pdf))
        .route("/api/dtr/xlsx", post(generate_xlsx))
        .route("/api/dtr/html", post(generate_html))
        .route("/api/dtr/report", post(generate_report))
        .route("/api/punch-log/employees", post(list_employees))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState { config }))
}

/// Start the HTTP server
pub async fn run(config: AppConfig) -> DtrResult<()> {
    let port = config.port;
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!(port, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check
async fn health_check() -> &'static str {
    "OK"
}

fn error_response(err: DtrError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        error!(error = %err, "DTR generation failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse { error: err.to_string() })).into_response()
}

/// Render the request in one format as a download
fn generate_document(state: &AppState, req: DtrRequest, format: OutputFormat) -> Response {
    let form = match req.into_form(&state.config) {
        Ok(form) => form,
        Err(e) => return error_response(e),
    };

    match render(&form, format, &state.config.render) {
        Ok(bytes) => {
            let disposition = format!(
                "attachment; filename=\"{}.{}\"",
                form.file_stem(),
                format.extension()
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, format.content_type().to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            ).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn generate_pdf(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DtrRequest>,
) -> Response {
    generate_document(&state, req, OutputFormat::Pdf)
}

async fn generate_xlsx(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DtrRequest>,
) -> Response {
    generate_document(&state, req, OutputFormat::Xlsx)
}

async fn generate_html(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DtrRequest>,
) -> Response {
    generate_document(&state, req, OutputFormat::Html)
}

/// Month table as JSON
async fn generate_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DtrRequest>,
) -> Response {
    match req.into_form(&state.config) {
        Ok(form) => (StatusCode::OK, Json(form.report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// List employee ids in a raw punch-log body
async fn list_employees(body: String) -> Response {
    let log = parse_punch_log(&body);
    (
        StatusCode::OK,
        Json(EmployeeIdsResponse {
            employee_ids: log.employee_ids(),
            skipped_lines: log.skipped_lines,
        }),
    ).into_response()
}

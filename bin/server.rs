// Fiscal Correction - Web Server
// Upload a ledger CSV, get the corrected export back. Stateless: one request, one run.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use fiscal_correction::{
    logging, CategoryTag, Config, CorrectedEntry, CorrectionError, CorrectionRun,
    CorrectionSummary, DeductionRule, KeywordRule, Pipeline, DEDUCTION_RULES, KEYWORD_RULES,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// Shared application state (read-only)
#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
    config: Arc<Config>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
}

/// Typed pipeline failure rendered as JSON
struct ApiError(CorrectionError);

impl From<CorrectionError> for ApiError {
    fn from(err: CorrectionError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_input_error() {
            warn!(code = self.0.code(), "rejected upload: {}", self.0);
        } else {
            error!(code = self.0.code(), "correction failed: {}", self.0);
        }

        let body = ErrorResponse {
            success: false,
            error: self.0.to_string(),
            code: self.0.code(),
        };

        (status, Json(body)).into_response()
    }
}

/// Preview payload for a rendering layer
#[derive(Serialize)]
struct PreviewResponse {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    entries: Vec<CorrectedEntry>,
    audit: Vec<String>,
    summary: CorrectionSummary,
    digest: String,
}

impl From<CorrectionRun> for PreviewResponse {
    fn from(run: CorrectionRun) -> Self {
        Self {
            summary: run.summary(),
            digest: run.digest(),
            audit: run.audit.lines().to_vec(),
            headers: run.table.headers,
            rows: run.table.records,
            entries: run.entries,
        }
    }
}

#[derive(Serialize)]
struct RulesResponse {
    keyword_rules: &'static [KeywordRule],
    default_category: CategoryTag,
    deduction_rules: &'static [DeductionRule],
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

fn run_upload(state: &AppState, body: &[u8]) -> Result<CorrectionRun, ApiError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("correction_run", %run_id, bytes = body.len());
    let _guard = span.enter();

    let delimiter = state.config.delimiter_byte()?;
    let run = state.pipeline.run_bytes(body, delimiter)?;

    info!(rows = run.entries.len(), "upload corrected");
    Ok(run)
}

/// POST /api/correct - Corrected CSV as a download
async fn correct_csv(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let run = run_upload(&state, &body)?;
    let csv = run.to_csv(state.config.delimiter_byte()?)?;

    let disposition = format!("attachment; filename=\"{}\"", state.config.export_file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// POST /api/preview - Corrected rows, audit trail and summary as JSON
async fn preview(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<PreviewResponse>>, ApiError> {
    let run = run_upload(&state, &body)?;
    Ok(Json(ApiResponse::ok(run.into())))
}

/// GET /api/rules - Classification and deduction tables
async fn rules() -> impl IntoResponse {
    Json(ApiResponse::ok(RulesResponse {
        keyword_rules: KEYWORD_RULES,
        default_category: CategoryTag::OtherCosts,
        deduction_rules: &DEDUCTION_RULES,
    }))
}

/// GET / - Serve upload page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/correct", post(correct_csv))
        .route("/preview", post(preview))
        .route("/rules", get(rules))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init("fiscal_correction=info,fiscal_server=info,tower_http=info");

    println!("🌐 Fiscal Correction - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "✓ Columns: '{}' / '{}'",
        config.label_column, config.amount_column
    );

    let addr = config.server_addr();
    let state = AppState {
        pipeline: Arc::new(Pipeline::from_config(&config)),
        config: Arc::new(config),
    };

    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("❌ Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: POST http://{}/api/correct", addr);
    println!("\n   Press Ctrl+C to stop\n");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}

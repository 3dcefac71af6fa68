//! # API REST
//!
//! REST API implementation for Aliven.
//!
//! Handles:
//! - HTTP endpoints with axum, including the PDF export endpoint
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, request tracing)
//!
//! Domain logic lives in `aliven-core`; this crate only maps it onto HTTP.

#![warn(rust_2018_idioms)]

use aliven_core::content::{default_prompt_pack, find_path, paths};
use aliven_core::rhythm::build_rhythm;
use aliven_core::{
    DraftHandoff, ExportPayload, PayloadWeek, PdfDocument, PdfExporter, PracticePath, WeekEntry,
};
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    exporter: Arc<PdfExporter>,
}

impl AppState {
    pub fn new(exporter: PdfExporter) -> Self {
        Self {
            exporter: Arc::new(exporter),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathRes {
    pub id: String,
    pub name: String,
    pub description: String,
    pub main_pillar: String,
    pub supports: Vec<String>,
}

impl From<&PracticePath> for PathRes {
    fn from(path: &PracticePath) -> Self {
        Self {
            id: path.id.to_string(),
            name: path.name.to_string(),
            description: path.description.to_string(),
            main_pillar: path.main_pillar.to_string(),
            supports: path.supports.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListPathsRes {
    pub paths: Vec<PathRes>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RhythmWeekRes {
    pub week: u8,
    pub practices: String,
    pub prompt: String,
}

impl From<WeekEntry> for RhythmWeekRes {
    fn from(entry: WeekEntry) -> Self {
        Self {
            week: entry.week.get(),
            practices: entry.practices,
            prompt: entry.prompt,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RhythmRes {
    pub path: PathRes,
    pub pack_id: String,
    pub weeks: Vec<RhythmWeekRes>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_paths, rhythm, export_pdf),
    components(schemas(
        HealthRes,
        PathRes,
        ListPathsRes,
        RhythmWeekRes,
        RhythmRes,
        ExportPayload,
        PayloadWeek,
    ))
)]
pub struct ApiDoc;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/paths", get(list_paths))
        .route("/rhythm", get(rhythm))
        .route("/api/export-pdf", post(export_pdf))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Aliven REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/paths",
    responses(
        (status = 200, description = "Practice path catalog", body = ListPathsRes)
    )
)]
/// Lists the practice paths a rhythm can be built from.
#[axum::debug_handler]
async fn list_paths(State(_state): State<AppState>) -> Json<ListPathsRes> {
    Json(ListPathsRes {
        paths: paths().iter().map(PathRes::from).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/rhythm",
    params(
        ("draftPathId" = String, Query, description = "Path to build the rhythm for"),
        ("draftPrompts" = Option<String>, Query, description = "JSON object of edited prompts keyed by week"),
        ("draftPractices" = Option<String>, Query, description = "JSON object of edited practices keyed by week"),
    ),
    responses(
        (status = 200, description = "Four-week rhythm with the handoff's edits applied", body = RhythmRes),
        (status = 400, description = "No path in the handoff"),
        (status = 404, description = "Unknown path")
    )
)]
/// Rebuilds a builder preview from a draft handoff link
///
/// Unreadable edit maps are ignored, so a damaged link still yields the path's default rhythm.
///
/// # Errors
/// Returns `400 Bad Request` if `draftPathId` is missing, and `404 Not Found` if it names no
/// known path.
#[axum::debug_handler]
async fn rhythm(
    State(_state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<RhythmRes>, (StatusCode, String)> {
    let handoff = DraftHandoff::from_query(query.as_deref().unwrap_or_default());

    let Some(path_id) = handoff.path_id.as_deref() else {
        return Err((StatusCode::BAD_REQUEST, "draftPathId is required".into()));
    };
    let Some(path) = find_path(path_id) else {
        tracing::warn!("rhythm requested for unknown path {:?}", path_id);
        return Err((StatusCode::NOT_FOUND, format!("unknown path: {path_id}")));
    };

    let pack = default_prompt_pack();
    let weeks = build_rhythm(path, pack, &handoff.overrides);

    Ok(Json(RhythmRes {
        path: PathRes::from(path),
        pack_id: pack.id.to_string(),
        weeks: weeks.into_iter().map(RhythmWeekRes::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/export-pdf",
    request_body = ExportPayload,
    responses(
        (status = 200, description = "Rendered PDF as an attachment", content_type = "application/pdf"),
        (status = 500, description = "Rendering failed; the body describes why")
    )
)]
/// Renders a plan to PDF
///
/// The body is optional. A body that is not a valid payload is treated as empty, so the
/// response is a document built from defaults rather than a client error.
///
/// # Errors
/// Returns `500 Internal Server Error` with a plain-text diagnostic if the browser cannot be
/// launched or the page cannot be rendered and printed.
#[axum::debug_handler]
async fn export_pdf(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, (StatusCode, String)> {
    let payload = ExportPayload::from_body(&body);

    match state.exporter.export(payload).await {
        Ok(doc) => {
            let disposition = doc.content_disposition();
            Ok((
                [
                    (header::CONTENT_TYPE, PdfDocument::CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                doc.bytes,
            )
                .into_response())
        }
        Err(e) => {
            tracing::error!("PDF export error: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("PDF export failed: {e}"),
            ))
        }
    }
}

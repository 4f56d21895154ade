//! HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::service::{HealthResponse, ScanResponse, ScanService};

/// Multipart field that carries the prescription image.
pub const UPLOAD_FIELD: &str = "file";

/// Shared application state for API handlers.
pub struct AppState {
    pub service: ScanService,
    pub port: u16,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload-prescription", post(upload_prescription))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.port))
}

async fn upload_prescription(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<ScanResponse> {
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };
    let image = match upload {
        Ok(image) => image,
        Err(message) => {
            warn!(%message, "rejected upload");
            return Json(ScanResponse::error(message));
        }
    };

    Json(state.service.scan(&image).await)
}

/// Pull the bytes of the upload field out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        debug!(
            file_name = field.file_name().unwrap_or("<unnamed>"),
            content_type = field.content_type().unwrap_or("<none>"),
            "reading upload"
        );
        let bytes = field.bytes().await.map_err(|e| e.body_text())?;
        return Ok(bytes.to_vec());
    }
    Err(format!("missing multipart field '{UPLOAD_FIELD}'"))
}

//! HTTP boundary
//!
//! - `GET /process/{processNumber}`: lookup as JSON
//! - `POST /paginate-movements`: slice a movement list
//! - `GET /health`

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::ScraperError;
use crate::pagination::paginate;
use crate::traits::ProcessLookup;

const NOT_FOUND_MESSAGE: &str = "Detalhes do processo não encontrados";
const INVALID_KEY_MESSAGE: &str = "Número de processo inválido";
const INTERNAL_ERROR_MESSAGE: &str = "Erro interno no servidor";

#[derive(Clone)]
pub struct AppState {
    lookup: Arc<dyn ProcessLookup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateRequest {
    pub movements: Vec<String>,
    pub page: usize,
    pub page_size: usize,
}

pub fn create_router(lookup: Arc<dyn ProcessLookup>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/process/{process_number}", get(get_process))
        .route("/paginate-movements", post(paginate_movements))
        .with_state(AppState { lookup })
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(lookup: Arc<dyn ProcessLookup>, addr: SocketAddr) -> Result<(), ScraperError> {
    let listener = TcpListener::bind(addr).await?;
    info!("API listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(lookup)).await?;
    Ok(())
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn get_process(
    State(state): State<AppState>,
    Path(process_number): Path<String>,
) -> Response {
    match state.lookup.lookup(&process_number).await {
        Ok(Some(details)) => Json(details).into_response(),
        Ok(None) => message(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
        Err(ScraperError::InvalidCaseKey(key)) => {
            warn!(key = %key, "Rejected malformed case key");
            message(StatusCode::BAD_REQUEST, INVALID_KEY_MESSAGE)
        }
        Err(e) => {
            error!(process_number = %process_number, "Lookup failed: {}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

async fn paginate_movements(Json(req): Json<PaginateRequest>) -> Json<Vec<String>> {
    Json(paginate(&req.movements, req.page, req.page_size).to_vec())
}

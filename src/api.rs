//! HTTP boundary of the service (feature `server`).
//!
//! Thin glue: decode JSON into typed arguments, call the domain service,
//! encode the result. All validation lives in the service; this layer only
//! maps the typed errors to status codes — validation → 400, missing
//! reference → 404, cancellation → 408, anything else → 500.

use crate::assistant::SuggestionRequest;
use crate::error::Error;
use crate::model::{Attribute, ParcelCategory, Point};
use crate::service::PlotService;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tokio_util::sync::CancellationToken;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PlotService>,
}

/// Wraps the domain error for axum's response machinery.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Cancelled => StatusCode::REQUEST_TIMEOUT,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

/// Builds the full route table over the shared service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/contours/drawn", post(create_drawn_contour))
        .route("/api/contours/coordinates", post(create_contour_from_coordinates))
        .route("/api/contours/import", post(import_contour))
        .route("/api/contours", get(list_contours))
        .route("/api/cards", post(create_card).get(get_card))
        .route("/api/parcels", get(list_parcels))
        .route(
            "/api/document-packages",
            post(generate_document_package).get(list_document_packages),
        )
        .route("/api/assistant/suggest", post(assistant_suggest))
        .route(
            "/api/business/processes",
            post(create_business_process).patch(update_business_process),
        )
        .route("/api/layer/publish", post(publish_layer_feature))
        .route("/api/layer", get(get_layer))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// In a fuller deployment the token would be tied to the client connection;
// here each request gets a token that never fires.
fn request_token() -> CancellationToken {
    CancellationToken::new()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ── Contours ──

#[derive(Deserialize)]
struct ContourRequest {
    #[serde(default)]
    description: String,
    #[serde(default)]
    points: Vec<Point>,
}

async fn create_drawn_contour(
    State(state): State<AppState>,
    Json(req): Json<ContourRequest>,
) -> ApiResult<crate::model::Contour> {
    let contour = state
        .service
        .create_contour_from_drawing(&request_token(), &req.description, req.points)
        .await?;
    Ok((StatusCode::CREATED, Json(contour)))
}

async fn create_contour_from_coordinates(
    State(state): State<AppState>,
    Json(req): Json<ContourRequest>,
) -> ApiResult<crate::model::Contour> {
    let contour = state
        .service
        .create_contour_from_coordinates(&request_token(), &req.description, req.points)
        .await?;
    Ok((StatusCode::CREATED, Json(contour)))
}

async fn import_contour(
    State(state): State<AppState>,
    Json(req): Json<ContourRequest>,
) -> ApiResult<crate::model::Contour> {
    let contour = state
        .service
        .import_contour(&request_token(), &req.description, req.points)
        .await?;
    Ok((StatusCode::CREATED, Json(contour)))
}

async fn list_contours(State(state): State<AppState>) -> ApiResult<Vec<crate::model::Contour>> {
    let contours = state.service.list_contours(&request_token()).await?;
    Ok((StatusCode::OK, Json(contours)))
}

// ── Information cards ──

#[derive(Deserialize)]
struct CardRequest {
    #[serde(default)]
    contour_id: String,
    #[serde(default)]
    auto_attributes: Vec<Attribute>,
    #[serde(default)]
    manual_attributes: Vec<Attribute>,
}

async fn create_card(
    State(state): State<AppState>,
    Json(req): Json<CardRequest>,
) -> ApiResult<crate::model::InformationCard> {
    let card = state
        .service
        .create_information_card(
            &request_token(),
            &req.contour_id,
            req.auto_attributes,
            req.manual_attributes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

#[derive(Deserialize)]
struct CardQuery {
    contour_id: String,
}

async fn get_card(
    State(state): State<AppState>,
    Query(query): Query<CardQuery>,
) -> ApiResult<Option<crate::model::InformationCard>> {
    let card = state
        .service
        .card_for_contour(&request_token(), &query.contour_id)
        .await?;
    Ok((StatusCode::OK, Json(card)))
}

// ── Ready parcels ──

#[derive(Deserialize)]
struct ParcelQuery {
    category: Option<ParcelCategory>,
}

async fn list_parcels(
    State(state): State<AppState>,
    Query(query): Query<ParcelQuery>,
) -> ApiResult<Vec<crate::model::ReadyParcel>> {
    let parcels = state
        .service
        .list_ready_parcels(&request_token(), query.category)
        .await?;
    Ok((StatusCode::OK, Json(parcels)))
}

// ── Document packages ──

#[derive(Deserialize)]
struct PackageRequest {
    contour_id: Option<String>,
    parcel_id: Option<String>,
}

async fn generate_document_package(
    State(state): State<AppState>,
    Json(req): Json<PackageRequest>,
) -> ApiResult<crate::model::DocumentPackage> {
    let package = state
        .service
        .generate_document_package(&request_token(), req.contour_id, req.parcel_id)
        .await?;
    Ok((StatusCode::CREATED, Json(package)))
}

async fn list_document_packages(
    State(state): State<AppState>,
) -> ApiResult<Vec<crate::model::DocumentPackage>> {
    let packages = state
        .service
        .list_document_packages(&request_token())
        .await?;
    Ok((StatusCode::OK, Json(packages)))
}

// ── Assistant ──

async fn assistant_suggest(
    State(state): State<AppState>,
    Json(req): Json<SuggestionRequest>,
) -> ApiResult<Vec<crate::model::AssistantSuggestion>> {
    let suggestions = state
        .service
        .assistant_suggestions(&request_token(), &req)
        .await?;
    Ok((StatusCode::OK, Json(suggestions)))
}

// ── Business processes ──

#[derive(Deserialize)]
struct ProcessRequest {
    #[serde(default)]
    name: String,
}

async fn create_business_process(
    State(state): State<AppState>,
    Json(req): Json<ProcessRequest>,
) -> ApiResult<crate::model::BusinessProcess> {
    let process = state
        .service
        .create_business_process(&request_token(), &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(process)))
}

#[derive(Deserialize)]
struct ProcessUpdateQuery {
    id: String,
    action: String,
    stage_id: Option<String>,
    success: Option<bool>,
}

/// `PATCH /api/business/processes?id=…&action=advance|complete`.
async fn update_business_process(
    State(state): State<AppState>,
    Query(query): Query<ProcessUpdateQuery>,
) -> ApiResult<crate::model::BusinessProcess> {
    let cancel = request_token();
    let process = match query.action.as_str() {
        "advance" => {
            state
                .service
                .advance_business_process(&cancel, &query.id)
                .await?
        }
        "complete" => {
            let stage_id = query
                .stage_id
                .ok_or_else(|| Error::validation("stage_id is required to complete a stage"))?;
            state
                .service
                .complete_business_stage(
                    &cancel,
                    &query.id,
                    &stage_id,
                    query.success.unwrap_or(true),
                )
                .await?
        }
        other => {
            return Err(Error::validation(format!("unknown action: {other}")).into());
        }
    };
    Ok((StatusCode::OK, Json(process)))
}

// ── Public layer ──

#[derive(Deserialize)]
struct PublishRequest {
    #[serde(default)]
    contour_id: String,
    #[serde(default)]
    attributes: HashMap<String, String>,
}

async fn publish_layer_feature(
    State(state): State<AppState>,
    Json(req): Json<PublishRequest>,
) -> ApiResult<crate::model::LayerFeature> {
    let feature = state
        .service
        .publish_contour_to_layer(&request_token(), &req.contour_id, req.attributes)
        .await?;
    Ok((StatusCode::CREATED, Json(feature)))
}

async fn get_layer(State(state): State<AppState>) -> ApiResult<crate::model::Layer> {
    let layer = state.service.layer(&request_token()).await?;
    Ok((StatusCode::OK, Json(layer)))
}

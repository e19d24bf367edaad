use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use shopsignal_core::bundles::ProductPair;
use shopsignal_core::domain::event::{EventMetadata, EventType};
use shopsignal_core::domain::product::{Product, ProductId, ProductPatch};
use shopsignal_core::domain::score::ProductScore;
use shopsignal_core::errors::{ApplicationError, DomainError, InterfaceError};
use shopsignal_core::scoring::{EngagementSummary, EngagementTier};
use shopsignal_engine::{EngineServices, ProductDraft, SalesReport};

#[derive(Clone)]
pub struct ApiState {
    services: EngineServices,
}

pub fn router(services: EngineServices) -> Router {
    Router::new()
        .route("/api/v1/events", post(record_event))
        .route("/api/v1/scores", get(list_scores))
        .route("/api/v1/scores/recalculate", post(recalculate_scores))
        .route("/api/v1/scores/{product_id}", get(get_score))
        .route("/api/v1/engagement/summary", get(engagement_summary))
        .route("/api/v1/products", get(list_products).post(add_product))
        .route(
            "/api/v1/products/{product_id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/api/v1/products/{product_id}/hover/start", post(hover_started))
        .route("/api/v1/products/{product_id}/hover/end", post(hover_ended))
        .route("/api/v1/products/{product_id}/click", post(product_clicked))
        .route("/api/v1/cart/{product_id}/add", post(cart_add))
        .route("/api/v1/cart/{product_id}/remove", post(cart_remove))
        .route("/api/v1/cart/{product_id}/purchase", post(cart_purchase))
        .route("/api/v1/bundles", get(bundle_suggestions))
        .route("/api/v1/analytics/sales", get(sales_report))
        .with_state(ApiState { services })
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiError(InterfaceError);

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub correlation_id: String,
}

fn api_error(error: impl Into<ApplicationError>) -> ApiError {
    ApiError(error.into().into_interface(Uuid::new_v4().to_string()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            InterfaceError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            InterfaceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            InterfaceError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            InterfaceError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        warn!(
            event_name = "api.request.failed",
            correlation_id = %self.0.correlation_id(),
            status = status.as_u16(),
            error = %self.0,
            "request failed"
        );

        let body = ApiErrorBody {
            error: code,
            message: self.0.user_message(),
            detail: status.is_client_error().then(|| self.0.to_string()),
            correlation_id: self.0.correlation_id().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

fn parse_product_id(raw: String) -> Result<ProductId, ApiError> {
    ProductId::parse(raw).map_err(api_error)
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RecordEventRequest {
    pub product_id: ProductId,
    pub event_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<EventMetadata>,
}

/// A score with its display tier.
#[derive(Debug, Serialize)]
pub struct ScoreView {
    #[serde(flatten)]
    pub score: ProductScore,
    pub tier: EngagementTier,
}

impl From<ProductScore> for ScoreView {
    fn from(score: ProductScore) -> Self {
        let tier = EngagementTier::from_score(score.normalized_score);
        Self { score, tier }
    }
}

async fn record_event(
    State(state): State<ApiState>,
    Json(body): Json<RecordEventRequest>,
) -> Result<(StatusCode, Json<ScoreView>), ApiError> {
    let event_type = body.event_type.parse::<EventType>().map_err(api_error)?;
    let score = state
        .services
        .tracker
        .record(body.product_id, event_type, body.user_id, body.metadata)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(score.into())))
}

async fn list_scores(State(state): State<ApiState>) -> Result<Json<Vec<ScoreView>>, ApiError> {
    let ranked = state.services.tracker.ranked_scores().await.map_err(api_error)?;
    Ok(Json(ranked.into_iter().map(ScoreView::from).collect()))
}

async fn get_score(
    Path(product_id): Path<String>,
    State(state): State<ApiState>,
) -> Result<Json<ScoreView>, ApiError> {
    let product_id = parse_product_id(product_id)?;
    let score = state.services.tracker.product_score(&product_id).await.map_err(api_error)?;
    score.map(|score| Json(score.into())).ok_or_else(|| {
        api_error(ApplicationError::NotFound(format!(
            "product `{product_id}` has no recorded engagement"
        )))
    })
}

#[derive(Debug, Serialize)]
pub struct RecalculateResponse {
    pub rewritten: usize,
    pub max_score_threshold: f64,
}

async fn recalculate_scores(
    State(state): State<ApiState>,
) -> Result<Json<RecalculateResponse>, ApiError> {
    let tracker = &state.services.tracker;
    let rewritten = tracker.try_recalculate_all().await.map_err(api_error)?;
    Ok(Json(RecalculateResponse {
        rewritten,
        max_score_threshold: tracker.normalizer().threshold(),
    }))
}

async fn engagement_summary(
    State(state): State<ApiState>,
) -> Result<Json<EngagementSummary>, ApiError> {
    Ok(Json(state.services.tracker.summary().await.map_err(api_error)?))
}

// ---------------------------------------------------------------------------
// Storefront interactions
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct InteractionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<EventMetadata>,
}

#[derive(Debug, Serialize)]
pub struct InteractionAccepted {
    pub product_id: ProductId,
    pub interaction: &'static str,
}

fn accepted(
    product_id: ProductId,
    interaction: &'static str,
) -> (StatusCode, Json<InteractionAccepted>) {
    (StatusCode::ACCEPTED, Json(InteractionAccepted { product_id, interaction }))
}

type Accepted = Result<(StatusCode, Json<InteractionAccepted>), ApiError>;

async fn hover_started(Path(product_id): Path<String>, State(state): State<ApiState>) -> Accepted {
    let product_id = parse_product_id(product_id)?;
    state.services.recorder.hover_started(product_id.clone());
    Ok(accepted(product_id, "hover_started"))
}

async fn hover_ended(Path(product_id): Path<String>, State(state): State<ApiState>) -> Accepted {
    let product_id = parse_product_id(product_id)?;
    state.services.recorder.hover_ended(&product_id);
    Ok(accepted(product_id, "hover_ended"))
}

async fn product_clicked(
    Path(product_id): Path<String>,
    State(state): State<ApiState>,
    body: Option<Json<InteractionRequest>>,
) -> Accepted {
    let product_id = parse_product_id(product_id)?;
    let Json(body) = body.unwrap_or_default();
    state
        .services
        .recorder
        .product_clicked(product_id.clone(), body.user_id, body.metadata)
        .await;
    Ok(accepted(product_id, "product_clicked"))
}

async fn cart_add(
    Path(product_id): Path<String>,
    State(state): State<ApiState>,
    body: Option<Json<InteractionRequest>>,
) -> Accepted {
    let product_id = parse_product_id(product_id)?;
    let Json(body) = body.unwrap_or_default();
    state.services.recorder.added_to_cart(product_id.clone(), body.user_id).await;
    Ok(accepted(product_id, "added_to_cart"))
}

async fn cart_remove(
    Path(product_id): Path<String>,
    State(state): State<ApiState>,
    body: Option<Json<InteractionRequest>>,
) -> Accepted {
    let product_id = parse_product_id(product_id)?;
    let Json(body) = body.unwrap_or_default();
    state
        .services
        .recorder
        .removed_from_cart(product_id.clone(), body.user_id, body.metadata)
        .await;
    Ok(accepted(product_id, "removed_from_cart"))
}

async fn cart_purchase(Path(product_id): Path<String>, State(state): State<ApiState>) -> Accepted {
    let product_id = parse_product_id(product_id)?;
    state.services.recorder.purchased(&product_id);
    Ok(accepted(product_id, "purchased"))
}

// ---------------------------------------------------------------------------
// Bundles and analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct BundleQuery {
    pub min_frequency: Option<u32>,
}

async fn bundle_suggestions(
    Query(query): Query<BundleQuery>,
    State(state): State<ApiState>,
) -> Result<Json<Vec<ProductPair>>, ApiError> {
    if query.min_frequency == Some(0) {
        return Err(api_error(DomainError::InvariantViolation(
            "min_frequency must be at least 1".to_owned(),
        )));
    }
    let bundles =
        state.services.bundles.suggestions(query.min_frequency).await.map_err(api_error)?;
    Ok(Json(bundles))
}

#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    pub product: Option<String>,
}

async fn sales_report(
    Query(query): Query<SalesQuery>,
    State(state): State<ApiState>,
) -> Result<Json<SalesReport>, ApiError> {
    let report =
        state.services.sales_reports.report(query.product.as_deref()).await.map_err(api_error)?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

async fn list_products(State(state): State<ApiState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.services.catalog.list().await.map_err(api_error)?))
}

async fn get_product(
    Path(product_id): Path<String>,
    State(state): State<ApiState>,
) -> Result<Json<Product>, ApiError> {
    let product_id = parse_product_id(product_id)?;
    Ok(Json(state.services.catalog.get(&product_id).await.map_err(api_error)?))
}

async fn add_product(
    State(state): State<ApiState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.services.catalog.add(draft).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    Path(product_id): Path<String>,
    State(state): State<ApiState>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let product_id = parse_product_id(product_id)?;
    Ok(Json(state.services.catalog.update(&product_id, patch).await.map_err(api_error)?))
}

async fn delete_product(
    Path(product_id): Path<String>,
    State(state): State<ApiState>,
) -> Result<StatusCode, ApiError> {
    let product_id = parse_product_id(product_id)?;
    state.services.catalog.delete(&product_id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

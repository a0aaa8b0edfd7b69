use crate::handlers::{self, AppState};
use crate::models::{
    CanonicalLead, CreateLeadResponse, FindLeadsResponse, FoundLead, LeadRequest, PhoneInfoBag,
    ProcessLeadsRequest, ProcessLeadsResponse, ProcessedLead, SearchCriteria,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Request body limit for the lead endpoints.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::find_leads,
        handlers::create_lead,
        handlers::process_leads
    ),
    components(schemas(
        SearchCriteria,
        CanonicalLead,
        PhoneInfoBag,
        FoundLead,
        FindLeadsResponse,
        LeadRequest,
        CreateLeadResponse,
        ProcessLeadsRequest,
        ProcessedLead,
        ProcessLeadsResponse
    )),
    tags((name = "leads", description = "Lead search and outreach"))
)]
pub struct ApiDoc;

/// Builds the HTTP application around `state`.
pub fn app(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/find-leads", post(handlers::find_leads))
        .route("/create-lead", post(handlers::create_lead))
        .route("/process-leads", post(handlers::process_leads))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

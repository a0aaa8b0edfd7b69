use crate::config::Config;
use crate::crm_client::{CrmClient, HubSpotClient};
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::outreach::{
    outreach_subject, HeuristicLeadScorer, LeadScorer, Mailer, MessageGenerator,
    OpenAiMessageGenerator, SmtpMailer,
};
use crate::pipeline::{LeadPipeline, PeopleSearch, PersonEnricher, PipelineOptions};
use crate::services::ApolloService;
use crate::validation::is_valid_email;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// People search provider.
    pub people_search: Arc<dyn PeopleSearch>,
    /// Enrichment and reveal provider.
    pub enricher: Arc<dyn PersonEnricher>,
    /// CRM the leads are pushed into.
    pub crm: Arc<dyn CrmClient>,
    /// Outreach message generator.
    pub generator: Arc<dyn MessageGenerator>,
    /// Outreach mail transport.
    pub mailer: Arc<dyn Mailer>,
    /// Lead scorer.
    pub scorer: Arc<dyn LeadScorer>,
}

impl AppState {
    /// Wires the production collaborators from `config`.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let apollo = ApolloService::new(&config).context("Apollo client")?;
        let crm = HubSpotClient::from_config(&config).context("HubSpot client")?;
        let generator = OpenAiMessageGenerator::new(&config).context("OpenAI client")?;
        let mailer = SmtpMailer::new(&config).context("SMTP transport")?;

        Ok(Self {
            people_search: Arc::new(apollo.clone()),
            enricher: Arc::new(apollo),
            crm: Arc::new(crm),
            generator: Arc::new(generator),
            mailer: Arc::new(mailer),
            scorer: Arc::new(HeuristicLeadScorer),
            config,
        })
    }
}

/// Health check endpoint.
///
/// Returns the service status and version.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-outreach-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /find-leads
///
/// Searches people matching the criteria, enriches and normalizes each hit,
/// skips excluded emails and returns at most 20 leads with their phone numbers.
#[utoipa::path(
    post,
    path = "/find-leads",
    tag = "leads",
    request_body = SearchCriteria,
    responses(
        (status = 200, description = "Leads found", body = FindLeadsResponse),
        (status = 400, description = "Missing job title"),
        (status = 502, description = "Search provider unavailable; `results` is empty")
    )
)]
pub async fn find_leads(
    State(state): State<Arc<AppState>>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<Json<FindLeadsResponse>, AppError> {
    tracing::info!("POST /find-leads - title: {}", criteria.job_title);

    if criteria.job_title.trim().is_empty() {
        return Err(AppError::BadRequest("job_title is required".to_string()));
    }

    let pipeline = LeadPipeline::new(
        state.people_search.as_ref(),
        state.enricher.as_ref(),
        PipelineOptions::from_config(&state.config),
    );
    let results = pipeline.run(&criteria).await?;

    Ok(Json(FindLeadsResponse { results }))
}

/// POST /create-lead
///
/// Single-lead path: generate the outreach message, upsert the CRM contact,
/// score the lead and mail the message. Any failure aborts the request.
#[utoipa::path(
    post,
    path = "/create-lead",
    tag = "leads",
    request_body = LeadRequest,
    responses(
        (status = 200, description = "Lead created and contacted", body = CreateLeadResponse),
        (status = 400, description = "Invalid email"),
        (status = 500, description = "Generation, CRM or mail failure")
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LeadRequest>,
) -> Result<Json<CreateLeadResponse>, AppError> {
    tracing::info!("POST /create-lead - {}", request.email);

    if !is_valid_email(&request.email) {
        return Err(AppError::BadRequest(format!(
            "Invalid email address: {}",
            request.email
        )));
    }

    let lead: CanonicalLead = request.into();
    let recipient = lead.contact_email().unwrap_or_default().to_string();

    let email_text = state.generator.generate(&lead).await?;
    let hubspot = state.crm.upsert_contact(&lead).await?;
    let score = state.scorer.score(&lead);

    state
        .mailer
        .send(&recipient, &outreach_subject(&lead), &email_text)
        .await?;

    Ok(Json(CreateLeadResponse {
        hubspot,
        email: email_text,
        score,
    }))
}

/// POST /process-leads
///
/// Batch path: every lead is handled in order and in isolation. A failing
/// step is reported in that lead's `error` field and the batch continues.
#[utoipa::path(
    post,
    path = "/process-leads",
    tag = "leads",
    request_body = ProcessLeadsRequest,
    responses(
        (status = 200, description = "Per-lead outcomes", body = ProcessLeadsResponse),
        (status = 400, description = "Empty batch")
    )
)]
pub async fn process_leads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessLeadsRequest>,
) -> Result<Json<ProcessLeadsResponse>, AppError> {
    tracing::info!(
        "POST /process-leads - {} lead(s), send_immediately: {}",
        request.leads.len(),
        request.send_immediately
    );

    if request.leads.is_empty() {
        return Err(AppError::BadRequest("No leads to process".to_string()));
    }

    let mut results = Vec::with_capacity(request.leads.len());
    for lead in request.leads {
        results.push(process_one(&state, lead, request.send_immediately).await);
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    tracing::info!(
        "Batch complete: {} processed, {} failed",
        results.len() - failed,
        failed
    );

    Ok(Json(ProcessLeadsResponse { results }))
}

async fn process_one(state: &AppState, lead: CanonicalLead, send_immediately: bool) -> ProcessedLead {
    let mut outcome = ProcessedLead {
        lead,
        email: None,
        hubspot: None,
        score: None,
        email_sent: false,
        error: None,
        processed_at: Utc::now(),
    };

    let email_text = match state.generator.generate(&outcome.lead).await {
        Ok(text) => text,
        Err(e) => return record_failure(outcome, e),
    };
    outcome.email = Some(email_text.clone());

    match state.crm.upsert_contact(&outcome.lead).await {
        Ok(confirmation) => outcome.hubspot = Some(confirmation),
        Err(e) => return record_failure(outcome, e),
    }

    outcome.score = Some(state.scorer.score(&outcome.lead));

    if send_immediately {
        if let Some(recipient) = outcome.lead.contact_email() {
            let subject = outreach_subject(&outcome.lead);
            if let Err(e) = state.mailer.send(recipient, &subject, &email_text).await {
                return record_failure(outcome, e);
            }
            outcome.email_sent = true;
        } else {
            tracing::debug!("{} has no email, message generated only", outcome.lead.full_name());
        }
    }

    outcome
}

fn record_failure(mut outcome: ProcessedLead, error: AppError) -> ProcessedLead {
    tracing::error!("✗ Failed to process lead {}: {}", outcome.lead.full_name(), error);
    outcome.error = Some(error.to_string());
    outcome
}

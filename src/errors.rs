use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The people search call failed; the whole invocation is aborted.
    SearchUnavailable(String),
    /// A per-candidate enrichment or reveal lookup failed.
    EnrichmentUnavailable(String),
    /// The language model did not produce an outreach message.
    GenerationFailed(String),
    /// The CRM contact could not be created or updated.
    CrmUpsertFailed(String),
    /// The outreach mail could not be delivered.
    MailDeliveryFailed(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Error interacting with an external API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Innermost error, skipping any context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::SearchUnavailable(msg) => write!(f, "Search unavailable: {}", msg),
            AppError::EnrichmentUnavailable(msg) => write!(f, "Enrichment unavailable: {}", msg),
            AppError::GenerationFailed(msg) => write!(f, "Message generation failed: {}", msg),
            AppError::CrmUpsertFailed(msg) => write!(f, "CRM upsert failed: {}", msg),
            AppError::MailDeliveryFailed(msg) => write!(f, "Mail delivery failed: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::SearchUnavailable(msg) => {
                tracing::error!("People search error: {}", msg);
                // Search failures carry an explicit empty result list
                let body = Json(json!({
                    "error": "Error fetching leads from the search provider.",
                    "results": [],
                }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }
            AppError::EnrichmentUnavailable(msg) => {
                tracing::warn!("Enrichment error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Enrichment service error".to_string(),
                )
            }
            AppError::GenerationFailed(msg) => {
                tracing::error!("Message generation error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error generating email content.".to_string(),
                )
            }
            AppError::CrmUpsertFailed(msg) => {
                tracing::error!("CRM error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error pushing lead to the CRM.".to_string(),
                )
            }
            AppError::MailDeliveryFailed(msg) => {
                tracing::error!("SMTP error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error sending email.".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                // Delegate to underlying error's response
                return (**source).clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApiError(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

//! Outreach collaborators: message generation, scoring and mail delivery.

use crate::config::Config;
use crate::errors::AppError;
use crate::models::CanonicalLead;
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Produces the outreach body for a lead.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, lead: &CanonicalLead) -> Result<String, AppError>;
}

/// Delivers a plain-text mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Rates a lead's potential as free text.
pub trait LeadScorer: Send + Sync {
    fn score(&self, lead: &CanonicalLead) -> String;
}

/// Builds the user prompt for one lead.
pub fn outreach_prompt(company_pitch: &str, lead: &CanonicalLead) -> String {
    format!(
        "{}\nWrite a personalized cold outreach email to {} {} at {}.\nMention potential value and request a short call. Keep it under 120 words.",
        company_pitch, lead.firstname, lead.lastname, lead.company
    )
}

/// Subject line of the outreach mail.
pub fn outreach_subject(lead: &CanonicalLead) -> String {
    format!(
        "Exciting Opportunity for {} {} at {}",
        lead.firstname, lead.lastname, lead.company
    )
}

// ============ OpenAI ============

/// Chat-completions backed [`MessageGenerator`].
pub struct OpenAiMessageGenerator {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    company_pitch: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiMessageGenerator {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent("lead-outreach-api/0.1")
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create OpenAI client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            company_pitch: config.company_pitch.clone(),
        })
    }
}

#[async_trait]
impl MessageGenerator for OpenAiMessageGenerator {
    async fn generate(&self, lead: &CanonicalLead) -> Result<String, AppError> {
        let prompt = outreach_prompt(&self.company_pitch, lead);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        tracing::info!("Generating outreach message for {}", lead.full_name());

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::GenerationFailed(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::GenerationFailed(format!(
                "OpenAI returned {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AppError::GenerationFailed(format!("Failed to parse OpenAI response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::GenerationFailed("OpenAI returned no content".to_string()))
    }
}

// ============ SMTP ============

/// STARTTLS SMTP [`Mailer`]; mails are sent from the authenticated user.
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    redirect_to: Option<Mailbox>,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::InternalError(format!("Invalid SMTP_HOST: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let from = config
            .smtp_user
            .parse()
            .map_err(|e| AppError::InternalError(format!("Invalid SMTP_USER mailbox: {}", e)))?;

        let redirect_to = config
            .outreach_redirect_to
            .as_deref()
            .map(str::parse::<Mailbox>)
            .transpose()
            .map_err(|e| {
                AppError::InternalError(format!("Invalid OUTREACH_REDIRECT_TO mailbox: {}", e))
            })?;

        Ok(Self {
            mailer,
            from,
            redirect_to,
        })
    }

    /// Mailbox the outreach for `to` is delivered to.
    ///
    /// A configured redirect replaces every recipient.
    pub fn recipient(&self, to: &str) -> Result<Mailbox, AppError> {
        match self.redirect_to {
            Some(ref mailbox) => Ok(mailbox.clone()),
            None => to.parse().map_err(|e| {
                AppError::MailDeliveryFailed(format!("Invalid recipient {}: {}", to, e))
            }),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        let recipient = self.recipient(to)?;

        let msg = Message::builder()
            .from(self.from.clone())
            .to(recipient.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::MailDeliveryFailed(format!("Failed to build email: {}", e)))?;

        self.mailer
            .send(msg)
            .await
            .map_err(|e| AppError::MailDeliveryFailed(e.to_string()))?;

        tracing::info!("Email sent to {}", recipient);
        Ok(())
    }
}

// ============ Scoring ============

/// Fixed heuristic: every lead matched by title and industry rates high.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicLeadScorer;

impl LeadScorer for HeuristicLeadScorer {
    fn score(&self, lead: &CanonicalLead) -> String {
        format!(
            "Score for lead '{}, role at {}': High potential (based on title and industry match)",
            lead.full_name(),
            lead.company
        )
    }
}

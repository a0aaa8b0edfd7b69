//! Shared fixtures: test config and in-memory collaborators.
#![allow(dead_code)]

use async_trait::async_trait;
use lead_outreach_api::config::Config;
use lead_outreach_api::crm_client::CrmClient;
use lead_outreach_api::errors::AppError;
use lead_outreach_api::handlers::AppState;
use lead_outreach_api::models::{CanonicalLead, OrganizationRecord, PersonRecord, SearchCriteria};
use lead_outreach_api::outreach::{HeuristicLeadScorer, Mailer, MessageGenerator};
use lead_outreach_api::pipeline::{PeopleSearch, PersonEnricher};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Helper function to create test config
pub fn create_test_config(base_url: String) -> Config {
    Config {
        port: 8080,
        apollo_api_key: "test_apollo_key".to_string(),
        apollo_base_url: base_url.clone(),
        apollo_page_size: 25,
        apollo_reveal_webhook_url: None,
        hubspot_token: "test_hubspot_token".to_string(),
        hubspot_base_url: base_url.clone(),
        openai_api_key: "test_openai_key".to_string(),
        openai_base_url: base_url,
        openai_model: "gpt-3.5-turbo".to_string(),
        smtp_host: "smtp.example.com".to_string(),
        smtp_port: 587,
        smtp_user: "outreach@example.com".to_string(),
        smtp_password: "test_pass".to_string(),
        company_pitch: "We sell widgets.".to_string(),
        outreach_redirect_to: None,
        company_placeholder: None,
        include_phone_on_lead: false,
    }
}

pub fn person(first: &str, last: &str, email: Option<&str>, org: Option<&str>) -> PersonRecord {
    PersonRecord {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        email: email.map(String::from),
        organization: org.map(|name| OrganizationRecord {
            name: Some(name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn criteria(title: &str) -> SearchCriteria {
    SearchCriteria {
        job_title: title.to_string(),
        ..Default::default()
    }
}

// ============ People search / enrichment ============

#[derive(Default)]
pub struct FakeSearch {
    pub people: Vec<PersonRecord>,
    pub fail: bool,
    pub calls: Mutex<usize>,
}

impl FakeSearch {
    pub fn returning(people: Vec<PersonRecord>) -> Self {
        Self {
            people,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PeopleSearch for FakeSearch {
    async fn search(
        &self,
        _criteria: &SearchCriteria,
        _per_page: u32,
    ) -> Result<Vec<PersonRecord>, AppError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(AppError::ExternalApiError("search returned 503".to_string()));
        }
        Ok(self.people.clone())
    }
}

/// Enrichment keyed by first name, reveal keyed by person id.
#[derive(Default)]
pub struct FakeEnricher {
    pub enriched: HashMap<String, PersonRecord>,
    pub revealed: HashMap<String, PersonRecord>,
    pub fail_enrich_for: HashSet<String>,
    pub fail_reveal: bool,
    pub enrich_calls: Mutex<Vec<String>>,
    pub reveal_calls: Mutex<Vec<String>>,
}

impl FakeEnricher {
    pub fn enrich_calls(&self) -> Vec<String> {
        self.enrich_calls.lock().unwrap().clone()
    }

    pub fn reveal_calls(&self) -> Vec<String> {
        self.reveal_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersonEnricher for FakeEnricher {
    async fn enrich(&self, raw: &PersonRecord) -> Result<Option<PersonRecord>, AppError> {
        let key = raw.first_name.clone().unwrap_or_default();
        self.enrich_calls.lock().unwrap().push(key.clone());
        if self.fail_enrich_for.contains(&key) {
            return Err(AppError::EnrichmentUnavailable(format!("no match service for {}", key)));
        }
        Ok(self.enriched.get(&key).cloned())
    }

    async fn reveal(&self, person_id: &str) -> Result<Option<PersonRecord>, AppError> {
        self.reveal_calls.lock().unwrap().push(person_id.to_string());
        if self.fail_reveal {
            return Err(AppError::EnrichmentUnavailable("reveal quota exhausted".to_string()));
        }
        Ok(self.revealed.get(person_id).cloned())
    }
}

// ============ Outreach collaborators ============

#[derive(Default)]
pub struct FakeCrm {
    pub fail_for: HashSet<String>,
    pub upserts: Mutex<Vec<String>>,
}

#[async_trait]
impl CrmClient for FakeCrm {
    async fn upsert_contact(&self, lead: &CanonicalLead) -> Result<Value, AppError> {
        let email = lead
            .contact_email()
            .ok_or_else(|| AppError::CrmUpsertFailed("lead has no email".to_string()))?;
        if self.fail_for.contains(email) {
            return Err(AppError::CrmUpsertFailed(format!("rejected {}", email)));
        }
        self.upserts.lock().unwrap().push(email.to_string());
        Ok(json!({"id": "101", "properties": {"email": email}}))
    }
}

#[derive(Default)]
pub struct FakeGenerator {
    pub fail_for: HashSet<String>,
}

#[async_trait]
impl MessageGenerator for FakeGenerator {
    async fn generate(&self, lead: &CanonicalLead) -> Result<String, AppError> {
        if self.fail_for.contains(&lead.firstname) {
            return Err(AppError::GenerationFailed("model overloaded".to_string()));
        }
        Ok(format!("Hi {}, let's talk about {}.", lead.firstname, lead.company))
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl FakeMailer {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::MailDeliveryFailed("connection refused".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

/// Handles to the fakes behind an [`AppState`].
pub struct Harness {
    pub search: Arc<FakeSearch>,
    pub enricher: Arc<FakeEnricher>,
    pub crm: Arc<FakeCrm>,
    pub generator: Arc<FakeGenerator>,
    pub mailer: Arc<FakeMailer>,
}

impl Harness {
    pub fn new(search: FakeSearch, enricher: FakeEnricher) -> Self {
        Self {
            search: Arc::new(search),
            enricher: Arc::new(enricher),
            crm: Arc::new(FakeCrm::default()),
            generator: Arc::new(FakeGenerator::default()),
            mailer: Arc::new(FakeMailer::default()),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::new(AppState {
            config: create_test_config("http://127.0.0.1:9".to_string()),
            people_search: self.search.clone(),
            enricher: self.enricher.clone(),
            crm: self.crm.clone(),
            generator: self.generator.clone(),
            mailer: self.mailer.clone(),
            scorer: Arc::new(HeuristicLeadScorer),
        })
    }
}

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{PeopleSearchResponse, PersonMatchResponse, PersonRecord, SearchCriteria};
use crate::pipeline::{PeopleSearch, PersonEnricher};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;

// ============ Apollo People API ============

/// Client for the Apollo people search and match endpoints.
#[derive(Clone)]
pub struct ApolloService {
    client: Client,
    base_url: String,
    api_key: String,
    reveal_webhook_url: Option<String>,
}

impl ApolloService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Apollo client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.apollo_base_url.clone(),
            api_key: config.apollo_api_key.clone(),
            reveal_webhook_url: config.apollo_reveal_webhook_url.clone(),
        })
    }

    /// Builds the search body; empty filters are left out.
    pub fn search_payload(criteria: &SearchCriteria, per_page: u32) -> Value {
        let mut payload = Map::new();
        payload.insert("per_page".to_string(), json!(per_page));

        let filters = [
            ("person_titles", &criteria.job_title),
            ("organization_names", &criteria.organization_name),
            ("person_locations", &criteria.location),
            ("industry_tags", &criteria.industry_tag),
        ];
        for (key, value) in filters {
            if !value.is_empty() {
                payload.insert(key.to_string(), json!([value]));
            }
        }

        Value::Object(payload)
    }

    /// Builds the reveal body for `person_id`.
    ///
    /// Apollo only accepts `reveal_phone_number` together with a `webhook_url`
    /// and delivers the numbers to that hook asynchronously. Without a hook
    /// only personal emails are revealed; phones already present in the match
    /// response still reach the phone bag.
    pub fn reveal_payload(person_id: &str, webhook_url: Option<&str>) -> Value {
        let mut payload = json!({
            "id": person_id,
            "reveal_personal_emails": true,
        });
        if let Some(hook) = webhook_url {
            payload["reveal_phone_number"] = json!(true);
            payload["webhook_url"] = json!(hook);
        }
        payload
    }

    /// Posts `body` to `{base_url}/{endpoint}` and decodes the JSON response.
    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header("Cache-Control", "no-cache")
            .header("X-Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Apollo request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Apollo {} returned status {}: {}",
                endpoint, status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Apollo {} response: {}", endpoint, e))
        })
    }
}

#[async_trait]
impl PeopleSearch for ApolloService {
    async fn search(
        &self,
        criteria: &SearchCriteria,
        per_page: u32,
    ) -> Result<Vec<PersonRecord>, AppError> {
        let payload = Self::search_payload(criteria, per_page);
        tracing::debug!("Apollo search payload: {}", payload);

        let result: PeopleSearchResponse = self
            .post("mixed_people/search", &payload)
            .await
            .map_err(|e| AppError::SearchUnavailable(e.to_string()))?;

        Ok(result.people)
    }
}

#[async_trait]
impl PersonEnricher for ApolloService {
    async fn enrich(&self, raw: &PersonRecord) -> Result<Option<PersonRecord>, AppError> {
        let payload = json!({
            "first_name": raw.first_name.as_deref().unwrap_or(""),
            "last_name": raw.last_name.as_deref().unwrap_or(""),
            "organization_name": raw.organization_name().unwrap_or(""),
            "linkedin_url": raw.linkedin_url.as_deref().unwrap_or(""),
            "reveal_personal_emails": true,
        });

        let result: PersonMatchResponse = self
            .post("people/match", &payload)
            .await
            .map_err(|e| AppError::EnrichmentUnavailable(e.to_string()))?;

        if result.person.is_none() {
            tracing::debug!(
                "No enrichment match for {} {}",
                raw.first_name.as_deref().unwrap_or(""),
                raw.last_name.as_deref().unwrap_or("")
            );
        }

        Ok(result.person)
    }

    async fn reveal(&self, person_id: &str) -> Result<Option<PersonRecord>, AppError> {
        let payload = Self::reveal_payload(person_id, self.reveal_webhook_url.as_deref());

        let result: PersonMatchResponse = self
            .post("people/match", &payload)
            .await
            .map_err(|e| AppError::EnrichmentUnavailable(format!("reveal {}: {}", person_id, e)))?;

        Ok(result.person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_payload_only_carries_filled_filters() {
        let criteria = SearchCriteria {
            job_title: "CTO".into(),
            location: "Cairo".into(),
            ..Default::default()
        };

        let payload = ApolloService::search_payload(&criteria, 25);
        assert_eq!(payload["per_page"], 25);
        assert_eq!(payload["person_titles"], json!(["CTO"]));
        assert_eq!(payload["person_locations"], json!(["Cairo"]));
        assert!(payload.get("organization_names").is_none());
        assert!(payload.get("industry_tags").is_none());
    }

    #[test]
    fn reveal_without_webhook_asks_for_emails_only() {
        let payload = ApolloService::reveal_payload("p-1", None);
        assert_eq!(payload["id"], "p-1");
        assert_eq!(payload["reveal_personal_emails"], true);
        assert!(payload.get("reveal_phone_number").is_none());
        assert!(payload.get("webhook_url").is_none());
    }

    #[test]
    fn reveal_with_webhook_asks_for_phones() {
        let payload = ApolloService::reveal_payload("p-1", Some("https://hooks.example.com/apollo"));
        assert_eq!(payload["reveal_phone_number"], true);
        assert_eq!(payload["webhook_url"], "https://hooks.example.com/apollo");
    }

    #[test]
    fn service_picks_up_configured_webhook() {
        let mut config = Config::for_tests("https://api.example.com");
        config.apollo_reveal_webhook_url = Some("https://hooks.example.com/apollo".into());
        let service = ApolloService::new(&config).unwrap();
        assert_eq!(
            service.reveal_webhook_url.as_deref(),
            Some("https://hooks.example.com/apollo")
        );
    }
}

use crate::config::Config;
use crate::errors::AppError;
use crate::models::CanonicalLead;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// CRM collaborator: update-if-exists-else-create, keyed by email.
///
/// The returned JSON is the CRM's confirmation and is not interpreted.
#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn upsert_contact(&self, lead: &CanonicalLead) -> Result<Value, AppError>;
}

/// Client for the HubSpot CRM contacts API.
#[derive(Clone)]
pub struct HubSpotClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HubSpotClient {
    /// Creates a new `HubSpotClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the HubSpot API.
    /// * `token` - The private app token used as bearer credential.
    pub fn new(base_url: String, token: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create HubSpot client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(config.hubspot_base_url.clone(), config.hubspot_token.clone())
    }

    /// Contact properties written on create and update.
    ///
    /// Unknown phone and job title are left out so an update never blanks
    /// values already stored on the contact.
    pub fn contact_properties(lead: &CanonicalLead) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert("firstname".to_string(), json!(lead.firstname));
        properties.insert("lastname".to_string(), json!(lead.lastname));
        properties.insert("company".to_string(), json!(lead.company));
        if let Some(phone) = lead.phone.as_deref().filter(|p| !p.is_empty()) {
            properties.insert("phone".to_string(), json!(phone));
        }
        if let Some(title) = lead.job_title.as_deref().filter(|t| !t.is_empty()) {
            properties.insert("jobtitle".to_string(), json!(title));
        }
        properties
    }

    /// Finds an existing contact id by exact email match.
    ///
    /// # Returns
    ///
    /// * `Result<Option<String>, AppError>` - The first matching contact id, if any.
    pub async fn find_contact_id(&self, email: &str) -> Result<Option<String>, AppError> {
        let url = format!("{}/crm/v3/objects/contacts/search", self.base_url);
        let body = json!({
            "filterGroups": [
                {
                    "filters": [
                        {
                            "propertyName": "email",
                            "operator": "EQ",
                            "value": email
                        }
                    ]
                }
            ]
        });

        let data = self.send_json(self.client.post(&url).json(&body), "contact search").await?;

        let contact_id = data
            .get("results")
            .and_then(|r| r.as_array())
            .and_then(|results| results.first())
            .and_then(|first| first.get("id"))
            .and_then(|id| {
                id.as_str()
                    .map(String::from)
                    .or_else(|| id.as_i64().map(|n| n.to_string()))
            });

        Ok(contact_id)
    }

    async fn update_contact(&self, contact_id: &str, lead: &CanonicalLead) -> Result<Value, AppError> {
        let url = format!("{}/crm/v3/objects/contacts/{}", self.base_url, contact_id);
        let body = json!({ "properties": Self::contact_properties(lead) });

        self.send_json(self.client.patch(&url).json(&body), "contact update")
            .await
    }

    async fn create_contact(&self, email: &str, lead: &CanonicalLead) -> Result<Value, AppError> {
        let url = format!("{}/crm/v3/objects/contacts", self.base_url);
        let mut properties = Self::contact_properties(lead);
        properties.insert("email".to_string(), json!(email));
        let body = json!({ "properties": properties });

        self.send_json(self.client.post(&url).json(&body), "contact creation")
            .await
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<Value, AppError> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("HubSpot {} failed: {}", operation, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "HubSpot {} returned {}: {}",
                operation, status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse HubSpot {} response: {}", operation, e))
        })
    }
}

#[async_trait]
impl CrmClient for HubSpotClient {
    async fn upsert_contact(&self, lead: &CanonicalLead) -> Result<Value, AppError> {
        let email = lead.contact_email().ok_or_else(|| {
            AppError::CrmUpsertFailed(format!(
                "Lead {} has no email to key the contact on",
                lead.full_name()
            ))
        })?;

        let outcome = match self.find_contact_id(email).await {
            Ok(Some(contact_id)) => {
                let updated = self.update_contact(&contact_id, lead).await;
                if updated.is_ok() {
                    tracing::info!("✓ Contact updated in HubSpot: {} ({})", email, contact_id);
                }
                updated
            }
            Ok(None) => {
                let created = self.create_contact(email, lead).await;
                if created.is_ok() {
                    tracing::info!("✓ Lead pushed to HubSpot: {}", email);
                }
                created
            }
            Err(e) => Err(e),
        };

        outcome.map_err(|e| AppError::CrmUpsertFailed(e.to_string()))
    }
}

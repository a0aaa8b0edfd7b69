use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use utoipa::ToSchema;

// ============ People Search Records ============

/// A person as returned by the people search, match and reveal calls.
///
/// The raw, enriched and revealed stages all share this shape; every field is
/// optional because the provider omits or nulls whatever it does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub organization: Option<OrganizationRecord>,

    // Phone representations, kept verbatim
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub sanitized_phone: Option<String>,
    #[serde(default)]
    pub sanitized_mobile_phone: Option<String>,
    #[serde(default)]
    pub direct_phone: Option<String>,
    #[serde(default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumberRecord>,
}

/// Organization sub-record of a [`PersonRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "short_description")]
    pub description: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

/// One entry of a person's `phone_numbers` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumberRecord {
    #[serde(default)]
    pub raw_number: Option<String>,
    #[serde(default)]
    pub sanitized_number: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl PersonRecord {
    pub fn organization_name(&self) -> Option<&str> {
        self.organization.as_ref().and_then(|o| o.name.as_deref())
    }

    pub fn organization_description(&self) -> Option<&str> {
        self.organization
            .as_ref()
            .and_then(|o| o.description.as_deref())
    }

    pub fn organization_linkedin_url(&self) -> Option<&str> {
        self.organization
            .as_ref()
            .and_then(|o| o.linkedin_url.as_deref())
    }

    /// Identifier usable for a reveal lookup, if the provider returned one.
    pub fn reveal_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Response envelope of the people search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeopleSearchResponse {
    #[serde(default)]
    pub people: Vec<PersonRecord>,
}

/// Response envelope of the people match endpoint (`person` may be null).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonMatchResponse {
    #[serde(default)]
    pub person: Option<PersonRecord>,
}

// ============ Canonical Lead ============

/// The merged, caller-facing lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CanonicalLead {
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub company: String,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub company_linkedin_url: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl CanonicalLead {
    /// Email if present and non-empty.
    pub fn contact_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Every phone representation seen for one lead, keyed by stage-namespaced tag.
///
/// The bag is a flat `tag -> number` map with no nested arrays. Scalar fields
/// keep their provider name behind the stage prefix (`""`, `enriched_`,
/// `revealed_`), e.g. `sanitized_phone` or `enriched_mobile_phone`. Entries of
/// a provider `phone_numbers` list become one key per index,
/// `{prefix}phone_numbers_{i}` (`phone_numbers_0`, `revealed_phone_numbers_1`),
/// holding the sanitized number or else the raw one. Consumers that want a
/// list collect the keys sharing a `phone_numbers_` stem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PhoneInfoBag(pub BTreeMap<String, String>);

impl PhoneInfoBag {
    pub fn insert(&mut self, tag: String, phone: String) {
        self.0.insert(tag, phone);
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Emails the caller has already processed; checked once per candidate.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet(HashSet<String>);

impl ExclusionSet {
    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(email)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ============ API Requests / Responses ============

/// Search filters for `POST /find-leads`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SearchCriteria {
    pub job_title: String,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub industry_tag: String,
    /// Emails to leave out of the results.
    #[serde(default)]
    pub exclude_emails: Vec<String>,
}

/// One emitted lead with every phone number found for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FoundLead {
    pub lead: CanonicalLead,
    #[serde(rename = "apollo_contact_info")]
    pub phone_info: PhoneInfoBag,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FindLeadsResponse {
    pub results: Vec<FoundLead>,
}

/// Body of `POST /create-lead`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    #[serde(default)]
    pub message: String,
}

impl From<LeadRequest> for CanonicalLead {
    fn from(req: LeadRequest) -> Self {
        CanonicalLead {
            firstname: req.firstname,
            lastname: req.lastname,
            email: Some(req.email).filter(|e| !e.is_empty()),
            phone: Some(req.phone).filter(|p| !p.is_empty()),
            company: req.company,
            message: req.message,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateLeadResponse {
    /// CRM confirmation, passed through untouched.
    #[schema(value_type = Object)]
    pub hubspot: serde_json::Value,
    /// Generated outreach text.
    pub email: String,
    pub score: String,
}

/// Body of `POST /process-leads`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessLeadsRequest {
    pub leads: Vec<CanonicalLead>,
    #[serde(default)]
    pub send_immediately: bool,
}

/// Outcome of one lead in a batch; `error` is set when any step failed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessedLead {
    pub lead: CanonicalLead,
    pub email: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub hubspot: Option<serde_json::Value>,
    pub score: Option<String>,
    pub email_sent: bool,
    pub error: Option<String>,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessLeadsResponse {
    pub results: Vec<ProcessedLead>,
}

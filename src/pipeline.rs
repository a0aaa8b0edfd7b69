/// Lead search pipeline
///
/// Runs one people search and turns every hit into a canonical lead:
/// 1. Search people (failure aborts the whole run)
/// 2. Enrich each hit (failure degrades to an empty record)
/// 3. Reveal contact fields when enrichment returned an id (same policy)
/// 4. Normalize and aggregate phone numbers
/// 5. Drop excluded emails and leads without a company
/// 6. Stop once the result cap is reached
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ExclusionSet, FoundLead, PersonRecord, SearchCriteria};
use crate::normalization::{aggregate_phones, cap, normalize, should_keep, MAX_LEADS};
use async_trait::async_trait;

/// People search collaborator.
#[async_trait]
pub trait PeopleSearch: Send + Sync {
    /// Returns one page of people matching `criteria`, in provider order.
    async fn search(
        &self,
        criteria: &SearchCriteria,
        per_page: u32,
    ) -> Result<Vec<PersonRecord>, AppError>;
}

/// Enrichment and reveal collaborator.
///
/// `Ok(None)` means the provider had no match; errors are recovered by the
/// pipeline and never abort a run.
#[async_trait]
pub trait PersonEnricher: Send + Sync {
    async fn enrich(&self, raw: &PersonRecord) -> Result<Option<PersonRecord>, AppError>;

    async fn reveal(&self, person_id: &str) -> Result<Option<PersonRecord>, AppError>;
}

/// Knobs applied to every run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_leads: usize,
    pub page_size: u32,
    /// Leave `CanonicalLead::phone` empty; phones travel in the bag.
    pub exclude_phone: bool,
    /// Label for leads without a company. `None` drops them.
    pub company_placeholder: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_leads: MAX_LEADS,
            page_size: 25,
            exclude_phone: true,
            company_placeholder: None,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_leads: MAX_LEADS,
            page_size: config.apollo_page_size,
            exclude_phone: !config.include_phone_on_lead,
            company_placeholder: config.company_placeholder.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Excluded,
    MissingCompany,
}

/// Terminal state of one search hit.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Emitted(FoundLead),
    Dropped(DropReason),
}

pub struct LeadPipeline<'a> {
    search: &'a dyn PeopleSearch,
    enricher: &'a dyn PersonEnricher,
    options: PipelineOptions,
}

impl<'a> LeadPipeline<'a> {
    pub fn new(
        search: &'a dyn PeopleSearch,
        enricher: &'a dyn PersonEnricher,
        options: PipelineOptions,
    ) -> Self {
        Self {
            search,
            enricher,
            options,
        }
    }

    /// Runs the search and returns at most `max_leads` emitted leads in
    /// arrival order. Candidates after the last accepted one are never enriched.
    pub async fn run(&self, criteria: &SearchCriteria) -> Result<Vec<FoundLead>, AppError> {
        let exclusions: ExclusionSet = criteria.exclude_emails.iter().cloned().collect();

        tracing::info!(
            "Searching people: title='{}', organization='{}', location='{}', industry='{}' ({} exclusions)",
            criteria.job_title,
            criteria.organization_name,
            criteria.location,
            criteria.industry_tag,
            exclusions.len()
        );

        let people = self
            .search
            .search(criteria, self.options.page_size)
            .await
            .map_err(|e| {
                if matches!(e.root(), AppError::SearchUnavailable(_)) {
                    e
                } else {
                    AppError::SearchUnavailable(e.to_string())
                }
            })?;

        tracing::info!("Search returned {} candidate(s)", people.len());

        let mut emitted = Vec::new();
        let mut dropped = 0usize;

        for raw in &people {
            if emitted.len() >= self.options.max_leads {
                tracing::info!(
                    "Reached {} leads, skipping remaining candidates",
                    self.options.max_leads
                );
                break;
            }

            match self.process_candidate(raw, &exclusions).await {
                CandidateOutcome::Emitted(found) => emitted.push(found),
                CandidateOutcome::Dropped(reason) => {
                    dropped += 1;
                    tracing::debug!(
                        "Dropped candidate {} {}: {:?}",
                        raw.first_name.as_deref().unwrap_or(""),
                        raw.last_name.as_deref().unwrap_or(""),
                        reason
                    );
                }
            }
        }

        tracing::info!(
            "Lead search complete: {} emitted, {} dropped",
            emitted.len(),
            dropped
        );

        Ok(cap(emitted, self.options.max_leads))
    }

    /// Enriches, normalizes and filters a single search hit.
    pub async fn process_candidate(
        &self,
        raw: &PersonRecord,
        exclusions: &ExclusionSet,
    ) -> CandidateOutcome {
        let enriched = match self.enricher.enrich(raw).await {
            Ok(person) => person,
            Err(e) => {
                tracing::warn!("Enrichment failed, using search data only: {}", e);
                None
            }
        };

        let revealed = match enriched.as_ref().and_then(PersonRecord::reveal_id) {
            Some(id) => match self.enricher.reveal(id).await {
                Ok(person) => person,
                Err(e) => {
                    tracing::warn!("Reveal failed for {}: {}", id, e);
                    None
                }
            },
            None => None,
        };

        let mut lead = normalize(
            raw,
            enriched.as_ref(),
            revealed.as_ref(),
            self.options.exclude_phone,
        );
        let phone_info = aggregate_phones(raw, enriched.as_ref(), revealed.as_ref());

        if !should_keep(&lead, exclusions) {
            return CandidateOutcome::Dropped(DropReason::Excluded);
        }

        if lead.company.is_empty() {
            match self.options.company_placeholder {
                Some(ref label) => lead.company = label.clone(),
                None => return CandidateOutcome::Dropped(DropReason::MissingCompany),
            }
        }

        CandidateOutcome::Emitted(FoundLead { lead, phone_info })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_dropping_and_excluding_phone() {
        let options = PipelineOptions::from_config(&Config::for_tests("https://api.example.com"));
        assert_eq!(options.max_leads, MAX_LEADS);
        assert_eq!(options.page_size, 25);
        assert!(options.exclude_phone);
        assert!(options.company_placeholder.is_none());
    }

    #[test]
    fn options_follow_phone_and_placeholder_switches() {
        let mut config = Config::for_tests("https://api.example.com");
        config.include_phone_on_lead = true;
        config.company_placeholder = Some("Unknown Company".into());
        config.apollo_page_size = 50;

        let options = PipelineOptions::from_config(&config);
        assert!(!options.exclude_phone);
        assert_eq!(options.company_placeholder.as_deref(), Some("Unknown Company"));
        assert_eq!(options.page_size, 50);
        assert_eq!(options.max_leads, MAX_LEADS);
    }
}

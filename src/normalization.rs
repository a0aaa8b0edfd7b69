//! Lead normalization and enrichment merge.
//!
//! Pure functions that turn the records fetched for one search hit (raw,
//! enriched, revealed) into a single [`CanonicalLead`] plus a [`PhoneInfoBag`],
//! and the small filters the pipeline applies afterwards:
//!
//! 1. [`resolve`] picks the first non-empty candidate for one field
//! 2. [`aggregate_phones`] keeps every phone variant side by side
//! 3. [`normalize`] applies the per-field precedence table
//! 4. [`should_keep`] checks the caller's exclusion set
//! 5. [`cap`] truncates the output in arrival order
//!
//! Nothing here performs I/O.

use crate::models::{CanonicalLead, ExclusionSet, PersonRecord, PhoneInfoBag};

/// Placeholder used for a missing first or last name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Maximum number of leads returned by one search.
pub const MAX_LEADS: usize = 20;

/// Returns the first candidate that is present and non-empty, else `default`.
///
/// Candidate order is the precedence order. Whitespace-only values count as
/// non-empty; trimming is up to the caller.
pub fn resolve<'a, I>(candidates: I, default: Option<&str>) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .or(default)
        .map(str::to_string)
}

/// Collects every phone representation from the three stages.
///
/// Keys are namespaced by stage (`""`, `"enriched_"`, `"revealed_"`), so no
/// two stages ever write the same key and nothing is discarded.
pub fn aggregate_phones(
    base: &PersonRecord,
    enriched: Option<&PersonRecord>,
    revealed: Option<&PersonRecord>,
) -> PhoneInfoBag {
    let mut bag = PhoneInfoBag::default();
    collect_phones(&mut bag, "", base);
    if let Some(record) = enriched {
        collect_phones(&mut bag, "enriched_", record);
    }
    if let Some(record) = revealed {
        collect_phones(&mut bag, "revealed_", record);
    }
    bag
}

fn collect_phones(bag: &mut PhoneInfoBag, prefix: &str, record: &PersonRecord) {
    let fields = [
        ("phone", &record.phone),
        ("phone_number", &record.phone_number),
        ("sanitized_phone", &record.sanitized_phone),
        ("sanitized_mobile_phone", &record.sanitized_mobile_phone),
        ("direct_phone", &record.direct_phone),
        ("mobile_phone", &record.mobile_phone),
    ];

    for (tag, value) in fields {
        if let Some(phone) = value.as_deref().filter(|p| !p.is_empty()) {
            bag.insert(format!("{}{}", prefix, tag), phone.to_string());
        }
    }

    for (idx, entry) in record.phone_numbers.iter().enumerate() {
        let number = resolve(
            [entry.sanitized_number.as_deref(), entry.raw_number.as_deref()],
            None,
        );
        if let Some(phone) = number {
            bag.insert(format!("{}phone_numbers_{}", prefix, idx), phone);
        }
    }
}

/// Merges the fetched records of one person into a [`CanonicalLead`].
///
/// Enriched values win over raw ones, except for the description where the
/// raw headline and summary come first. The revealed record only contributes
/// the email, ahead of the other stages. When `exclude_phone` is set the
/// canonical phone stays empty and callers use [`aggregate_phones`] instead.
///
/// The company name resolves to `""` when unknown; the pipeline decides
/// whether such a lead is dropped or relabelled.
pub fn normalize(
    raw: &PersonRecord,
    enriched: Option<&PersonRecord>,
    revealed: Option<&PersonRecord>,
    exclude_phone: bool,
) -> CanonicalLead {
    let empty = PersonRecord::default();
    let enriched = enriched.unwrap_or(&empty);
    let revealed = revealed.unwrap_or(&empty);

    let phone = if exclude_phone {
        None
    } else {
        resolve(
            [
                raw.phone.as_deref(),
                raw.sanitized_phone.as_deref(),
                enriched.phone_number.as_deref(),
                enriched.sanitized_phone.as_deref(),
            ],
            None,
        )
    };

    CanonicalLead {
        firstname: resolve(
            [enriched.first_name.as_deref(), raw.first_name.as_deref()],
            Some(UNKNOWN_NAME),
        )
        .unwrap_or_default(),
        lastname: resolve(
            [enriched.last_name.as_deref(), raw.last_name.as_deref()],
            Some(UNKNOWN_NAME),
        )
        .unwrap_or_default(),
        email: resolve(
            [
                revealed.email.as_deref(),
                enriched.email.as_deref(),
                raw.email.as_deref(),
            ],
            None,
        ),
        phone,
        company: resolve(
            [enriched.organization_name(), raw.organization_name()],
            Some(""),
        )
        .unwrap_or_default(),
        company_description: resolve(
            [
                enriched.organization_description(),
                raw.organization_description(),
            ],
            None,
        ),
        company_linkedin_url: resolve(
            [
                enriched.organization_linkedin_url(),
                raw.organization_linkedin_url(),
            ],
            None,
        ),
        job_title: resolve([enriched.title.as_deref(), raw.title.as_deref()], None),
        description: resolve(
            [
                raw.headline.as_deref(),
                raw.summary.as_deref(),
                enriched.headline.as_deref(),
                enriched.summary.as_deref(),
            ],
            None,
        ),
        linkedin_url: resolve(
            [enriched.linkedin_url.as_deref(), raw.linkedin_url.as_deref()],
            None,
        ),
        message: String::new(),
    }
}

/// False when the lead has a non-empty email listed in `exclusions`.
pub fn should_keep(lead: &CanonicalLead, exclusions: &ExclusionSet) -> bool {
    match lead.contact_email() {
        Some(email) => !exclusions.contains(email),
        None => true,
    }
}

/// Keeps the first `max` items in arrival order.
pub fn cap<T>(mut items: Vec<T>, max: usize) -> Vec<T> {
    items.truncate(max);
    items
}

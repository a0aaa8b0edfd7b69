/// Property-based tests using proptest
/// Invariants of the merge rules that should hold for all inputs
use lead_outreach_api::models::{
    CanonicalLead, ExclusionSet, OrganizationRecord, PersonRecord, PhoneNumberRecord,
};
use lead_outreach_api::normalization::{
    aggregate_phones, cap, normalize, resolve, should_keep, UNKNOWN_NAME,
};
use lead_outreach_api::validation::is_valid_email;
use proptest::prelude::*;

fn maybe_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-zA-Z0-9 ]{1,12}".prop_map(Some),
    ]
}

prop_compose! {
    fn arb_person()(
        first_name in maybe_text(),
        last_name in maybe_text(),
        email in maybe_text(),
        title in maybe_text(),
        headline in maybe_text(),
        org_name in maybe_text(),
        phone in maybe_text(),
        sanitized_phone in maybe_text(),
        mobile_phone in maybe_text(),
        listed in prop::collection::vec((maybe_text(), maybe_text()), 0..3),
    ) -> PersonRecord {
        PersonRecord {
            first_name,
            last_name,
            email,
            title,
            headline,
            organization: Some(OrganizationRecord { name: org_name, ..Default::default() }),
            phone,
            sanitized_phone,
            mobile_phone,
            phone_numbers: listed
                .into_iter()
                .map(|(raw_number, sanitized_number)| PhoneNumberRecord {
                    raw_number,
                    sanitized_number,
                    kind: None,
                })
                .collect(),
            ..Default::default()
        }
    }
}

// Property: resolve returns the first non-empty candidate, the default only as a fallback
proptest! {
    #[test]
    fn resolve_picks_first_non_empty(candidates in prop::collection::vec(maybe_text(), 0..6)) {
        let result = resolve(candidates.iter().map(|c| c.as_deref()), Some("fallback"));
        let expected = candidates
            .iter()
            .flatten()
            .find(|c| !c.is_empty())
            .cloned()
            .unwrap_or_else(|| "fallback".to_string());
        prop_assert_eq!(result, Some(expected));
    }

    #[test]
    fn resolve_never_returns_empty_without_default(candidates in prop::collection::vec(maybe_text(), 0..6)) {
        if let Some(value) = resolve(candidates.iter().map(|c| c.as_deref()), None) {
            prop_assert!(!value.is_empty());
        }
    }
}

// Property: cap never exceeds max and keeps arrival order
proptest! {
    #[test]
    fn cap_is_an_ordered_prefix(items in prop::collection::vec(any::<u16>(), 0..50), max in 0usize..30) {
        let capped = cap(items.clone(), max);
        prop_assert!(capped.len() <= max);
        prop_assert_eq!(capped.len(), items.len().min(max));
        prop_assert_eq!(&capped[..], &items[..capped.len()]);
    }
}

// Property: exclusion only ever removes listed, non-empty emails
proptest! {
    #[test]
    fn listed_email_is_dropped(email in "[a-z]{1,8}@[a-z]{1,8}\\.com", others in prop::collection::vec("[a-z]{1,8}@x\\.org", 0..5)) {
        let mut listed = others.clone();
        listed.push(email.clone());
        let exclusions: ExclusionSet = listed.into_iter().collect();
        let lead = CanonicalLead { email: Some(email), ..Default::default() };
        prop_assert!(!should_keep(&lead, &exclusions));
    }

    #[test]
    fn lead_without_email_is_never_dropped(listed in prop::collection::vec("[a-z]{0,8}", 0..5)) {
        let exclusions: ExclusionSet = listed.into_iter().collect();
        prop_assert!(should_keep(&CanonicalLead::default(), &exclusions));
        let blank = CanonicalLead { email: Some(String::new()), ..Default::default() };
        prop_assert!(should_keep(&blank, &exclusions));
    }
}

// Property: the phone bag only grows as stages are added, and never holds empty values
proptest! {
    #[test]
    fn phone_bag_grows_with_stages(raw in arb_person(), enriched in arb_person(), revealed in arb_person()) {
        let base_only = aggregate_phones(&raw, None, None);
        let with_enriched = aggregate_phones(&raw, Some(&enriched), None);
        let all = aggregate_phones(&raw, Some(&enriched), Some(&revealed));

        prop_assert!(base_only.len() <= with_enriched.len());
        prop_assert!(with_enriched.len() <= all.len());
        for (tag, phone) in &base_only.0 {
            prop_assert_eq!(all.get(tag), Some(phone.as_str()));
        }
        prop_assert!(all.0.values().all(|p| !p.is_empty()));
    }
}

// Property: normalize always yields names and honors the phone switch
proptest! {
    #[test]
    fn normalized_names_are_never_empty(raw in arb_person(), enriched in prop::option::of(arb_person())) {
        let lead = normalize(&raw, enriched.as_ref(), None, true);
        prop_assert!(!lead.firstname.is_empty());
        prop_assert!(!lead.lastname.is_empty());
        if raw.first_name.as_deref().unwrap_or("").is_empty()
            && enriched.as_ref().and_then(|e| e.first_name.as_deref()).unwrap_or("").is_empty()
        {
            prop_assert_eq!(lead.firstname, UNKNOWN_NAME);
        }
    }

    #[test]
    fn excluded_phone_is_always_absent(raw in arb_person(), enriched in prop::option::of(arb_person())) {
        let lead = normalize(&raw, enriched.as_ref(), None, true);
        prop_assert!(lead.phone.is_none());
    }

    #[test]
    fn revealed_email_takes_precedence(raw in arb_person(), enriched in arb_person(), email in "[a-z]{1,8}@[a-z]{1,8}\\.io") {
        let revealed = PersonRecord { email: Some(email.clone()), ..Default::default() };
        let lead = normalize(&raw, Some(&enriched), Some(&revealed), true);
        prop_assert_eq!(lead.email, Some(email));
    }

    #[test]
    fn normalize_is_idempotent(raw in arb_person(), enriched in prop::option::of(arb_person())) {
        let first = normalize(&raw, enriched.as_ref(), None, false);
        let second = normalize(&raw, enriched.as_ref(), None, false);
        prop_assert_eq!(first, second);
    }
}

// Property: email validation should never panic
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn simple_emails_are_valid(
        local in "[a-z]{1,10}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }
}

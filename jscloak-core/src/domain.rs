//! Domain-lock parsing and validation

use crate::errors::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

// Dot-separated labels of [a-z0-9-], alphabetic TLD of at least two letters.
static HOSTNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:[a-z0-9-]+\.)+[a-z]{2,}$").unwrap());

pub fn is_valid_domain(domain: &str) -> bool {
    HOSTNAME_REGEX.is_match(domain)
}

/// Check every entry for hostname shape, then check for duplicates. The first
/// malformed entry wins over a duplicate appearing earlier in the list.
pub fn validate_domain_lock(domains: &[String]) -> Result<(), ValidationError> {
    if let Some(bad) = domains.iter().find(|domain| !is_valid_domain(domain)) {
        return Err(ValidationError::InvalidDomain(bad.clone()));
    }

    let mut seen = HashSet::with_capacity(domains.len());
    if !domains.iter().all(|domain| seen.insert(domain.as_str())) {
        return Err(ValidationError::DuplicateDomains);
    }

    Ok(())
}

/// Split a comma-separated input field into domain entries, trimming each and
/// dropping empties. No validation happens here.
pub fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|domain| !domain.is_empty())
        .map(str::to_string)
        .collect()
}

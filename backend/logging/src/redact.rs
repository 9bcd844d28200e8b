//! Log redaction
//!
//! Raw assistant replies and upstream error bodies get logged for diagnosis.
//! Both can carry secrets (bearer credentials) or patient-identifying details
//! (phone numbers printed on prescriptions); scrub them first.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[A-Za-z0-9\-_]{20,})|(Bearer\s+[A-Za-z0-9\-\._~+/]+=*)").unwrap()
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

/// Redacts credentials and phone numbers in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_CREDENTIAL]");
    PHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]").to_string()
}

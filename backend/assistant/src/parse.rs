//! Extraction of prescription records from an assistant reply.
//!
//! The assistant is instructed to answer with a fenced ```json block, but
//! that is a prompt-level contract, not a protocol guarantee. The parser
//! therefore looks for a fenced block first (tolerating a missing language
//! tag), falls back to the whole trimmed payload, and then enforces an
//! explicit structural contract: a non-empty list of medicine records,
//! either bare or wrapped in a `medicines` object. Anything else fails —
//! partial or empty results never survive.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use rxlens_core::{Medicine, Prescription, RxError};

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Locate the fenced payload in a reply, falling back to the whole text.
pub fn fenced_payload(text: &str) -> &str {
    FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| text.trim())
}

/// Parse an assistant reply into a prescription.
pub fn parse_reply(text: &str) -> Result<Prescription, RxError> {
    let payload = fenced_payload(text);

    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|_| parse_failure(text))?;

    let prescription = coerce_shape(value).ok_or_else(|| parse_failure(text))?;

    if prescription.medicines.is_empty() {
        return Err(parse_failure(text));
    }
    Ok(prescription)
}

/// Apply the structural contract: a bare array of medicine records, or an
/// object wrapping a `medicines` array (optionally with metadata).
fn coerce_shape(value: serde_json::Value) -> Option<Prescription> {
    match value {
        serde_json::Value::Array(_) => {
            let medicines: Vec<Medicine> = serde_json::from_value(value).ok()?;
            Some(Prescription::from_medicines(medicines))
        }
        serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

fn parse_failure(raw: &str) -> RxError {
    // Raw text is kept for diagnosis only; it is never surfaced as data.
    warn!(
        reply = %logging::redact_sensitive_data(raw),
        "Assistant reply was not parseable prescription data"
    );
    RxError::Parse
}

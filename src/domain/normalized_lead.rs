use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::{
    LeadSubmission, RequestMeta,
    field::{is_truthy, trimmed_string_or_default},
};

/// Pipeline stage of a lead on the automation side. A lead always starts as `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeadStatus {
    #[serde(rename = "Neu")]
    New,
}

/// The payload forwarded to the automation webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub category: String,
    pub source: String,
    pub message: String,
    /// Newline separated, human readable time slots.
    pub availability: String,
    /// Comma separated ISO-8601 time slots.
    #[serde(rename = "availability_iso")]
    pub availability_iso: String,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub created_at: DateTime<Utc>,
    pub status: LeadStatus,
    pub meta: RequestMeta,
}

impl NormalizedLead {
    /// Build the outbound payload. Validation is the caller's job: a required field that is
    /// missing simply ends up empty.
    pub fn new(submission: &LeadSubmission, meta: RequestMeta, created_at: DateTime<Utc>) -> Self {
        let required = |field: &str| trimmed_string_or_default(submission.get(field));
        let message = submission.get("message");

        Self {
            first_name: required("firstName"),
            last_name: required("lastName"),
            email: required("email").to_lowercase(),
            phone: required("phone"),
            city: required("city"),
            category: required("category"),
            source: required("source"),
            message: if is_truthy(message) {
                trimmed_string_or_default(message)
            } else {
                String::new()
            },
            availability: verbatim_string(submission.get("availability")),
            availability_iso: verbatim_string(submission.get("availability_iso")),
            created_at,
            status: LeadStatus::New,
            meta,
        }
    }
}

// Availability slots are passed through untouched, but only when they are strings.
fn verbatim_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    }
}

fn serialize_iso_millis<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

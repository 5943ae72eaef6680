use serde_json::{Map, Value};

use super::field::{coerce_to_string, is_truthy};

/// Fields a lead must fill in before it is forwarded.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "firstName",
    "lastName",
    "email",
    "phone",
    "city",
    "category",
    "source",
];

/// Hidden form input. People never see it, bots fill it in.
const HONEYPOT_FIELD: &str = "website";

/// A form submission exactly as the caller sent it.
///
/// Nothing about the values is trusted yet, they are only read through the helpers in
/// `domain::field`.
#[derive(Debug, Clone, Default)]
pub struct LeadSubmission {
    fields: Map<String, Value>,
}

impl LeadSubmission {
    /// Parse a JSON request body. Anything other than a JSON object yields an empty submission,
    /// which then fails validation like a form with nothing filled in.
    pub fn from_json(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Parse an `application/x-www-form-urlencoded` request body. Every value is a string.
    /// When a key repeats, the last value wins.
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).unwrap_or_default();
        let fields = pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// A submission is spam when the honeypot carries anything but whitespace.
    pub fn is_spam(&self) -> bool {
        let honeypot = self.get(HONEYPOT_FIELD);
        is_truthy(honeypot)
            && honeypot
                .and_then(coerce_to_string)
                .is_some_and(|text| !text.trim().is_empty())
    }

    /// Names of the required fields that were not filled in, in form order.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|field| !is_truthy(self.get(field)))
            .collect()
    }
}

impl From<Map<String, Value>> for LeadSubmission {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

mod field;
mod lead_submission;
mod normalized_lead;
mod request_meta;

pub use field::{coerce_to_string, is_truthy, trimmed_string_or_default};
pub use lead_submission::{LeadSubmission, REQUIRED_FIELDS};
pub use normalized_lead::{LeadStatus, NormalizedLead};
pub use request_meta::RequestMeta;

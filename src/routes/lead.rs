use actix_web::{
    HttpMessage, HttpRequest, HttpResponse, ResponseError, http::StatusCode, web,
};
use chrono::Utc;

use crate::{
    configuration::WEBHOOK_URL_VARIABLE,
    domain::{LeadSubmission, NormalizedLead, RequestMeta},
    routes::error_chain_fmt,
    webhook_client::{WebhookClient, WebhookError, WebhookOutcome},
};

/// Longest upstream error body we echo back to the caller.
const MAX_UPSTREAM_DETAIL_CHARS: usize = 300;

#[derive(serde::Serialize)]
struct OkBody {
    ok: bool,
}

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

#[derive(thiserror::Error)]
pub enum LeadError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Bitte alle Pflichtfelder ausfüllen.")]
    MissingFields,
    #[error("Server-Konfiguration fehlt ({}).", WEBHOOK_URL_VARIABLE)]
    MissingConfiguration,
    #[error("n8n Webhook Fehler")]
    Upstream { detail: String },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

// Same logic to get the full error chain on `Debug`
impl std::fmt::Debug for LeadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LeadError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeadError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            LeadError::MissingFields => StatusCode::BAD_REQUEST,
            LeadError::MissingConfiguration | LeadError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            LeadError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut message = self.to_string();
        if message.is_empty() {
            message = "Unknown error".to_string();
        }
        let detail = match self {
            LeadError::Upstream { detail } => Some(detail.as_str()),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: &message,
            detail,
        })
    }
}

/// `submit_lead` validates a form submission and relays it to the automation webhook,
/// translating the webhook's answer into the response for the form.
///
/// A filled honeypot gets the same answer as a lead that went through, bots must not be able
/// to tell they were caught.
#[tracing::instrument(
    name = "Receiving a lead",
    skip(request, body, webhook_client),
    fields(
        lead_source = tracing::field::Empty,
        lead_category = tracing::field::Empty
    )
)]
pub async fn submit_lead(
    request: HttpRequest,
    body: web::Bytes,
    webhook_client: web::Data<WebhookClient>,
) -> Result<HttpResponse, LeadError> {
    let submission = parse_submission(&request, &body);

    if submission.is_spam() {
        tracing::info!("Honeypot field is filled in, discarding the submission");
        return Ok(ok_response());
    }

    let missing_fields = submission.missing_required_fields();
    if !missing_fields.is_empty() {
        tracing::warn!(?missing_fields, "Rejecting an incomplete submission");
        return Err(LeadError::MissingFields);
    }

    let lead = NormalizedLead::new(&submission, RequestMeta::from_request(&request), Utc::now());
    let span = tracing::Span::current();
    span.record("lead_source", tracing::field::display(&lead.source));
    span.record("lead_category", tracing::field::display(&lead.category));

    match webhook_client.forward(&lead).await {
        Ok(WebhookOutcome::Accepted) => Ok(ok_response()),
        Ok(WebhookOutcome::Rejected { status, body }) => {
            tracing::warn!(webhook_status = status.as_u16(), "The webhook rejected the lead");
            Err(LeadError::Upstream {
                detail: truncate_chars(&body, MAX_UPSTREAM_DETAIL_CHARS),
            })
        }
        Err(WebhookError::NotConfigured) => {
            tracing::error!("Cannot forward the lead, no webhook URL is configured");
            Err(LeadError::MissingConfiguration)
        }
        // The URL stays out of the message, it is handed back to the caller.
        Err(WebhookError::Transport(e)) => Err(anyhow::Error::new(e.without_url()).into()),
    }
}

/// Every method other than POST ends up here.
pub async fn method_not_allowed() -> Result<HttpResponse, LeadError> {
    Err(LeadError::MethodNotAllowed)
}

fn ok_response() -> HttpResponse {
    HttpResponse::Ok().json(OkBody { ok: true })
}

/// Classic form posts are urlencoded, scripts send JSON. A request without a content type is
/// read as JSON too. Any other body carries no fields and fails validation.
fn parse_submission(request: &HttpRequest, body: &[u8]) -> LeadSubmission {
    let content_type = request.content_type();
    if content_type.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
        LeadSubmission::from_urlencoded(body)
    } else if content_type.is_empty() || content_type.eq_ignore_ascii_case("application/json") {
        LeadSubmission::from_json(body)
    } else {
        LeadSubmission::default()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

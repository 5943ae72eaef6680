use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::domain::NormalizedLead;

/// Header the automation side checks to make sure a lead really came from us.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Relays normalized leads to the automation webhook.
///
/// The destination is optional on purpose: a missing URL is a configuration error reported to
/// the caller of a request, it must not keep the server from starting.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http_client: Client,
    url: Option<String>,
    secret: Option<Secret<String>>,
}

/// What the webhook made of a lead it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Accepted,
    Rejected { status: StatusCode, body: String },
}

#[derive(thiserror::Error, Debug)]
pub enum WebhookError {
    #[error("No webhook URL is configured")]
    NotConfigured,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl WebhookClient {
    /// Without a `timeout` the client waits for the webhook as long as the connection stays open.
    pub fn new(
        url: Option<String>,
        secret: Option<Secret<String>>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        Ok(Self {
            http_client,
            url,
            secret,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Send a single POST with the lead as JSON body. There is no retry, the outcome of the
    /// one attempt is returned as is.
    #[tracing::instrument(name = "Forwarding lead to the webhook", skip(self, lead))]
    pub async fn forward(&self, lead: &NormalizedLead) -> Result<WebhookOutcome, WebhookError> {
        let url = self.url.as_deref().ok_or(WebhookError::NotConfigured)?;

        // `.json` sets `Content-Type: application/json`
        let mut request = self.http_client.post(url).json(lead);
        if let Some(secret) = &self.secret {
            request = request.header(WEBHOOK_SECRET_HEADER, secret.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(WebhookOutcome::Accepted);
        }

        let body = response.text().await?;
        Ok(WebhookOutcome::Rejected { status, body })
    }
}

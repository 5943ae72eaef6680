use std::sync::LazyLock;

use lead_intake::{
    configuration::{Settings, get_configuration},
    startup::Application,
    telemetry::{get_subscriber, init_subscriber_as_global_default},
};
use secrecy::Secret;
use serde_json::json;
use wiremock::MockServer;

// Ensure that the 'Tracing' stack is only initialized once using `LazyLock`
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // The sink is part of the type returned by `get_subscriber`, so both branches
    // have to initialize the subscriber on their own.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber_as_global_default(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber_as_global_default(subscriber);
    }
});

pub const WEBHOOK_PATH: &str = "/webhook/lead";

pub struct TestApp {
    pub address: String,
    pub webhook_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_lead(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/lead", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_lead_form(&self, body: String) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/lead", &self.address))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Bodies the webhook received so far, decoded as JSON.
    pub async fn forwarded_leads(&self) -> Vec<serde_json::Value> {
        self.webhook_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

/// A submission with every field filled in.
pub fn valid_lead() -> serde_json::Value {
    json!({
        "firstName": "Ursula",
        "lastName": "Le Guin",
        "email": "ursula_le_guin@gmail.com",
        "phone": "+49 30 1234567",
        "city": "Berlin",
        "category": "Fenster",
        "source": "landingpage",
        "message": "Bitte um Rückruf",
        "availability": "Mo 10:00-12:00\nDi 14:00-16:00",
        "availability_iso": "2026-03-16T10:00:00.000Z,2026-03-17T14:00:00.000Z",
        "website": "",
    })
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn the application with the webhook pointing at a fresh mock server.
/// `customize` runs last and can change any setting, e.g. drop the webhook URL.
pub async fn spawn_app_with(customize: impl FnOnce(&mut Settings)) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    LazyLock::force(&TRACING);

    let webhook_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Port 0 makes the OS pick a random free port
        c.application.port = 0;
        c.webhook.url = Some(format!("{}{}", webhook_server.uri(), WEBHOOK_PATH));
        c.webhook.secret = None;
        c.webhook.timeout_milliseconds = Some(2_000);
        customize(&mut c);
        c
    };

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    let port = application.port();
    // Launch the server as a background task
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        webhook_server,
        api_client: reqwest::Client::new(),
    }
}

pub fn with_secret(secret: &str) -> impl FnOnce(&mut Settings) {
    let secret = secret.to_string();
    move |c| c.webhook.secret = Some(Secret::new(secret))
}

use crate::configuration::{Settings, WebhookSettings};
use crate::{
    routes::{health_check, method_not_allowed, submit_lead},
    webhook_client::WebhookClient,
};
use actix_web::{App, HttpServer, dev::Server, web};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/// `Application` works as a wrapper for actix_web `dev::Server`.
/// `dev::Server` does not tell us which port it was bound to, the tests need to know it when
/// they ask the OS for a random one.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Given a configuration of type `Settings`:
    /// 1. A webhook client is configured. A missing webhook URL is not an error here, it is
    ///    reported on every lead instead.
    /// 2. A server is started with `run`, which can be accessed using `run_until_stopped`
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let webhook_client = get_webhook_client(&configuration.webhook)?;
        if !webhook_client.is_configured() {
            tracing::warn!("No webhook URL is configured, leads will be answered with a 500");
        }

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, webhook_client)?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_webhook_client(configuration: &WebhookSettings) -> Result<WebhookClient, reqwest::Error> {
    WebhookClient::new(
        configuration.url(),
        configuration.secret(),
        configuration.timeout(),
    )
}

pub fn run(listener: TcpListener, webhook_client: WebhookClient) -> Result<Server, std::io::Error> {
    // web::Data wraps our client in an Arc<T>
    let webhook_client = web::Data::new(webhook_client);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/api/lead")
                    .route(web::post().to(submit_lead))
                    .default_service(web::route().to(method_not_allowed)),
            )
            .app_data(webhook_client.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}

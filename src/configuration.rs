//! src/configuration.rs

use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};

/// Variable names used by the hosting platform. They take precedence over the yaml files and
/// the `APP_` prefixed variables so existing deployments keep working.
pub const WEBHOOK_URL_VARIABLE: &str = "N8N_WEBHOOK_URL";
pub const WEBHOOK_SECRET_VARIABLE: &str = "N8N_WEBHOOK_SECRET";

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub webhook: WebhookSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    // Converts from str to u16 in case we set it up with an environment variable
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct WebhookSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub secret: Option<Secret<String>>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub timeout_milliseconds: Option<u64>,
}

impl WebhookSettings {
    /// The destination URL, if one is configured. A blank value counts as missing.
    pub fn url(&self) -> Option<String> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
    }

    /// The shared secret, if one is configured. A blank value counts as missing, we never send
    /// an empty secret header.
    pub fn secret(&self) -> Option<Secret<String>> {
        self.secret
            .as_ref()
            .filter(|secret| !secret.expose_secret().is_empty())
            .cloned()
    }

    /// `None` keeps the outbound call unbounded.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_milliseconds
            .map(std::time::Duration::from_millis)
    }
}

/// The possible runtime environment for our application
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

/// Parses the raw value of APP_ENVIRONMENT into one of the supported environments.
impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. \
Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let configuration_directory = base_path.join("configuration");
    // Detect the running environment, defaults to `local` if unspecified
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and
        // '__' as separator)
        // E.g. `APP_WEBHOOK__URL=https://...` would set `Settings.webhook.url`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("webhook.url", std::env::var(WEBHOOK_URL_VARIABLE).ok())?
        .set_override_option("webhook.secret", std::env::var(WEBHOOK_SECRET_VARIABLE).ok())?
        .build()?;
    settings.try_deserialize::<Settings>()
}

use lead_intake::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber_as_global_default},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("lead_intake".into(), "info".into(), std::io::stdout);
    init_subscriber_as_global_default(subscriber);

    let configuration = get_configuration()?;
    let application = Application::build(configuration).await?;

    application.run_until_stopped().await?;
    Ok(())
}

use ledgerdesk::testing::DemoData;
use ledgerdesk::utils::parse_env;
use ledgerdesk::{App, AppState, ConfigBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigBuilder::new().from_env().build()?;
    ledgerdesk::init_tracing_with_config(&config);

    let seed = parse_env("DEMO_SEED").unwrap_or(2024);
    let subscribers = parse_env("DEMO_SUBSCRIBERS").unwrap_or(60);
    let data = DemoData::generate(seed, subscribers);
    tracing::info!(
        seed,
        subscribers = data.subscribers.len(),
        invoices = data.invoices.len(),
        payments = data.payments.len(),
        tickets = data.tickets.len(),
        "seeded in-memory repositories"
    );

    let state = AppState::builder()
        .with_config(&config)
        .with_demo_data(data)
        .build();

    App::new(config, state).serve().await?;
    Ok(())
}

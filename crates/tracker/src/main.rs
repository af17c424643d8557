use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tracker::{config::TrackerConfig, run_replay};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = TrackerConfig::from_env();

    tracing::info!("Tracking walks for user {}", config.user_id);

    match run_replay(config).await? {
        Some(saved) => println!("{}", serde_json::to_string_pretty(&saved.record)?),
        None => tracing::info!("Nothing recorded"),
    }

    Ok(())
}

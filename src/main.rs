use anyhow::Context;
use inventory_api::{config::Config, logging, run_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logger();
    tracing::info!("inventory-api v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("invalid configuration")?;
    run_app(config).await
}

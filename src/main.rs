use fightcal::startup;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting fightcal sync");

    // Load configuration
    let config = startup::load_config()?;

    // Run the sync once
    startup::run_sync(config).await
}

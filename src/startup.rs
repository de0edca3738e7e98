use crate::components::event_extractor::{EventExtractor, HttpEventSource};
use crate::components::google_calendar::{FileCredentialProvider, GoogleCalendarClient};
use crate::components::reconciler::Reconciler;
use crate::components::sync_driver::{SyncDriver, SyncOutcome};
use crate::config::Config;
use crate::error::{config_error, Error, SyncResult};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn,html5ever=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Assemble the production driver; credentials live as long as the driver
pub fn build_driver(config: &Config) -> SyncResult<SyncDriver<HttpEventSource, GoogleCalendarClient>> {
    let source = HttpEventSource::new(config.events_url.clone())?;

    let base_url = url::Url::parse(&config.events_url)
        .map_err(|e| config_error(&format!("Invalid EVENTS_URL: {}", e)))?;
    let extractor = EventExtractor::new(base_url)?;

    let credentials = Arc::new(FileCredentialProvider::new(
        config.token_path.clone(),
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    ));
    let calendar = GoogleCalendarClient::new(
        &config.calendar_api_base,
        &config.google_calendar_id,
        credentials,
    )?;

    let reconciler = Reconciler::new(config.match_strategy, config.timezone);

    Ok(SyncDriver::new(
        source,
        calendar,
        extractor,
        reconciler,
        config.retry.clone(),
    ))
}

/// Run one synchronization and report how it went
pub async fn run_sync(config: Config) -> miette::Result<()> {
    info!(
        "Syncing {} into calendar {} (matching by {:?})",
        config.events_url, config.google_calendar_id, config.match_strategy
    );

    let driver = build_driver(&config)?;

    match driver.run().await? {
        SyncOutcome::Completed { attempts, summary } => {
            for skipped in &summary.skipped {
                warn!("Skipped event card {}: {}", skipped.index, skipped.reason);
            }
            info!(
                "Sync finished after {} attempt(s): {} events, {} updated, {} inserted, {} stale entries left",
                attempts,
                summary.scraped,
                summary.report.updated(),
                summary.report.inserted(),
                summary.report.stale.len()
            );
        }
        SyncOutcome::GaveUp {
            attempts,
            last_error,
        } => {
            warn!(
                "Sync gave up after {} attempts, last error: {}",
                attempts, last_error
            );
        }
    }

    Ok(())
}

use anyhow::Context;
use tracing::{info, warn};

use tech_feed_weekly::collector::collect;
use tech_feed_weekly::{logging, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    info!("Starting feed collector...");

    let settings = Settings::from_env().context("failed to load settings")?;
    let summary = collect(&settings).await?;

    if let Err(errors) = summary.errors.into_result() {
        // Partial failures do not fail the job
        warn!("Warning: Some feeds failed to process: {}", errors);
        for error in &errors {
            warn!("  {}", error);
        }
    }

    info!("Feed collector completed ({} new items)", summary.added);
    Ok(())
}

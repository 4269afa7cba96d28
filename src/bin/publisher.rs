use anyhow::Context;
use tracing::info;

use tech_feed_weekly::publisher::{publish, PublishOutcome};
use tech_feed_weekly::{logging, Settings};

fn main() -> anyhow::Result<()> {
    logging::init();
    info!("Starting publisher...");

    let settings = Settings::from_env().context("failed to load settings")?;

    let outcome = publish(
        &settings.latest_items_path,
        &settings.output_dir,
        &settings.output_file,
    )
    .context("failed to publish digest")?;

    match outcome {
        PublishOutcome::Empty => info!("Nothing to publish"),
        PublishOutcome::Written { path, items } => {
            info!("Published {} items to {}", items, path.display())
        }
    }

    info!("Publisher completed successfully");
    Ok(())
}

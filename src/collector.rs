//! The collect job: load sources, find new items, persist store then sources.

use anyhow::Context;
use tracing::{info, warn};

use crate::catalog::FeedCatalog;
use crate::config::Settings;
use crate::error::{ProcessError, ProcessErrors};
use crate::fetcher::Fetcher;
use crate::processor::{process_all, save_changed};
use crate::store::ItemStore;

#[derive(Debug)]
pub struct CollectSummary {
    /// Items appended to the store by this run.
    pub added: usize,
    /// Partial failures. The run still saved everything it could.
    pub errors: ProcessErrors,
}

/// Run one collect pass.
///
/// Configuration and store failures abort the run; per-source failures are
/// returned in [`CollectSummary::errors`].
pub async fn collect(settings: &Settings) -> anyhow::Result<CollectSummary> {
    info!("Loading configuration files...");
    let mut catalog = FeedCatalog::load(&settings.config_dir)
        .context("failed to load feed configurations")?;
    info!(
        "Loaded {} configuration files with {} total feed configurations",
        catalog.file_count(),
        catalog.source_count()
    );

    info!("Loading existing latest items...");
    let mut store = ItemStore::load_or_create(&settings.latest_items_path)
        .context("failed to load latest items")?;
    info!("Loaded {} existing items", store.len());

    let fetcher = Fetcher::new(settings).context("failed to create HTTP client")?;

    info!("Processing feeds to find new items...");
    let mut report = process_all(&fetcher, &mut catalog, &store).await;

    if settings.hatena.enabled {
        match fetcher.fetch_hot_entries().await {
            Ok(items) => report.new_items.extend(items),
            Err(e) => {
                warn!("Failed to fetch hot entries: {}", e);
                report.errors.push(ProcessError::HotEntries(e));
            }
        }
    }

    let mut added = 0;
    for item in std::mem::take(&mut report.new_items) {
        let label = format!("{} - {}", item.category, item.title);
        if store.add(item) {
            added += 1;
            info!("Added new item: {}", label);
        }
    }

    if added > 0 {
        info!(
            "Saving {} new items to {}",
            added,
            settings.latest_items_path.display()
        );
        store
            .save(&settings.latest_items_path)
            .context("failed to save latest items")?;
    } else {
        info!("No new items found");
    }

    // Watermarks only move on disk once the items they cover are saved
    save_changed(&catalog, &mut report);

    Ok(CollectSummary {
        added,
        errors: report.errors,
    })
}

//! Novelty detection: compare each source's latest item against its
//! watermark and the item store, then persist changed source files.

use std::collections::BTreeSet;

use tracing::{error, info, warn};

use crate::catalog::FeedCatalog;
use crate::error::{FetchError, ProcessError, ProcessErrors};
use crate::fetcher::Fetcher;
use crate::models::{DiscoveredItem, FeedSource};
use crate::store::ItemStore;

/// What happened to one source during a run.
#[derive(Debug)]
pub enum FeedOutcome {
    /// Fetch or parse failed. The watermark is left alone.
    Failed(FetchError),
    /// The latest link equals the recorded watermark.
    Unchanged,
    /// The link is new for this source but already waiting in the store.
    /// The watermark is advanced, no item is emitted.
    AlreadyStored { link: String },
    /// A genuinely new item. The watermark is advanced.
    New(DiscoveredItem),
}

impl FeedOutcome {
    /// Whether the source's `latest_link` was changed.
    pub fn updated_source(&self) -> bool {
        matches!(self, FeedOutcome::AlreadyStored { .. } | FeedOutcome::New(_))
    }
}

/// Result of processing every source in a catalog.
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub new_items: Vec<DiscoveredItem>,
    /// Categories whose sources had their watermark advanced in memory.
    pub changed_categories: Vec<String>,
    /// Categories whose file was rewritten successfully.
    pub updated_categories: Vec<String>,
    pub errors: ProcessErrors,
}

/// Fetch `source` and decide whether its latest item is new.
pub async fn process_feed(
    fetcher: &Fetcher,
    source: &mut FeedSource,
    store: &ItemStore,
) -> FeedOutcome {
    let latest = match fetcher.fetch_latest_item(source).await {
        Ok(item) => item,
        Err(e) => return FeedOutcome::Failed(e),
    };

    if latest.link == source.latest_link {
        info!("No new item for {}: latest link unchanged", source.name);
        return FeedOutcome::Unchanged;
    }

    source.latest_link = latest.link.clone();

    if store.contains_link(&latest.link) {
        info!("Item already exists for {}: {}", source.name, latest.link);
        return FeedOutcome::AlreadyStored { link: latest.link };
    }

    info!("New item found for {}: {}", source.name, latest.title);
    FeedOutcome::New(latest)
}

/// Process every source of every file, one at a time.
///
/// Nothing is written here. Changed categories are listed in
/// [`ProcessReport::changed_categories`] for [`save_changed`], which must
/// only run after the new items are persisted. A failing source never stops
/// the others; every failure ends up in [`ProcessReport::errors`].
pub async fn process_all(
    fetcher: &Fetcher,
    catalog: &mut FeedCatalog,
    store: &ItemStore,
) -> ProcessReport {
    let mut report = ProcessReport::default();
    let mut changed = BTreeSet::new();

    for (category, file) in catalog.files.iter_mut() {
        info!("Processing category: {}", category);

        for source in file.sources.iter_mut() {
            info!("Processing feed: {}", source.name);

            let outcome = process_feed(fetcher, source, store).await;
            if outcome.updated_source() {
                changed.insert(category.clone());
            }

            match outcome {
                FeedOutcome::Failed(e) => {
                    error!("Error processing {}: {}", source.name, e);
                    report.errors.push(ProcessError::Fetch {
                        source_name: source.name.clone(),
                        category: category.clone(),
                        error: e,
                    });
                }
                FeedOutcome::New(item) => report.new_items.push(item),
                FeedOutcome::Unchanged | FeedOutcome::AlreadyStored { .. } => {}
            }
        }
    }

    report.changed_categories = changed.into_iter().collect();

    if !report.errors.is_empty() {
        warn!("Encountered {} errors during processing", report.errors.len());
    }

    report
}

/// Write each changed file exactly once, recording successes in
/// [`ProcessReport::updated_categories`] and failures in its errors.
pub fn save_changed(catalog: &FeedCatalog, report: &mut ProcessReport) {
    for category in std::mem::take(&mut report.changed_categories) {
        let Some(file) = catalog.get(&category) else {
            continue;
        };
        match file.save() {
            Ok(()) => {
                info!("Updated config file for category: {}", category);
                report.updated_categories.push(category);
            }
            Err(e) => {
                error!("Error updating config file for {}: {}", category, e);
                report.errors.push(ProcessError::ConfigWrite { category, error: e });
            }
        }
    }
}

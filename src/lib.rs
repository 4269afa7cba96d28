//! Tech Feed Weekly - a weekly digest of new technology posts
//!
//! The collector polls configured RSS/Atom feeds and GitHub issue lists,
//! records items it has not seen before in a JSON store, and advances each
//! source's latest-link watermark. The publisher later renders the stored
//! items into a static HTML page and clears the store.

pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod hatena;
pub mod logging;
pub mod models;
pub mod parser;
pub mod processor;
pub mod publisher;
pub mod store;

pub use catalog::{ConfigFile, FeedCatalog};
pub use config::Settings;
pub use error::{ConfigError, FetchError, ProcessError, ProcessErrors, PublishError, StoreError};
pub use fetcher::Fetcher;
pub use models::{DiscoveredItem, FeedSource, SourceType};
pub use store::ItemStore;

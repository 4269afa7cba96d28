use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::DiscoveredItem;

/// Items discovered since the last publish, persisted as `{"items": [...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStore {
    #[serde(default)]
    pub items: Vec<DiscoveredItem>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store, creating its directory and an empty file when absent.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        if !path.exists() {
            let empty = Self::new();
            empty.save(path)?;
            return Ok(empty);
        }

        Self::load(path)
    }

    /// Load an existing store. A missing file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(StoreError::Serialize)?;
        fs::write(path, json).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.items.iter().any(|item| item.link == link)
    }

    /// Append `item` unless an item with the same link is already stored.
    /// Returns whether it was added.
    pub fn add(&mut self, item: DiscoveredItem) -> bool {
        if self.contains_link(&item.link) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

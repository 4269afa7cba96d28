//! Feed source files: loading the config directory and writing updated
//! watermarks back to the file each source came from.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::models::{FeedFile, FeedSource};

/// The sources loaded from one `*.json` file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    /// File stem, shared by every source in `sources`.
    pub category: String,
    pub sources: Vec<FeedSource>,
}

impl ConfigFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let category = category_for(path);

        let content = fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FeedFile =
            serde_json::from_slice(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let sources = file
            .data
            .into_iter()
            .map(|mut source| {
                source.category = category.clone();
                source
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            category,
            sources,
        })
    }

    /// Write `{"data": [...]}` back to the origin path.
    pub fn save(&self) -> Result<(), ConfigError> {
        let file = FeedFile {
            data: self.sources.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(ConfigError::Serialize)?;
        fs::write(&self.path, json).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Every feed source file, keyed by category.
///
/// Passed explicitly through a collect run; the processor mutates the
/// sources in place and writes back the files that changed.
#[derive(Debug, Default)]
pub struct FeedCatalog {
    pub files: BTreeMap<String, ConfigFile>,
}

impl FeedCatalog {
    /// Load every `*.json` file under `dir`, recursing into subdirectories.
    ///
    /// Two files with the same stem would share a category, so that is an
    /// error.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let mut paths = Vec::new();
        collect_json_files(dir.as_ref(), &mut paths)?;
        paths.sort();

        let mut files: BTreeMap<String, ConfigFile> = BTreeMap::new();
        for path in paths {
            let file = ConfigFile::load(&path)?;
            debug!(
                "Loaded {} sources from {}",
                file.sources.len(),
                path.display()
            );
            if let Some(existing) = files.get(&file.category) {
                return Err(ConfigError::DuplicateCategory {
                    category: file.category,
                    first: existing.path.clone(),
                    second: file.path,
                });
            }
            files.insert(file.category.clone(), file);
        }

        Ok(Self { files })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn source_count(&self) -> usize {
        self.files.values().map(|f| f.sources.len()).sum()
    }

    pub fn get(&self, category: &str) -> Option<&ConfigFile> {
        self.files.get(category)
    }

    /// Every source across every file, in category order.
    pub fn all_sources(&self) -> Vec<FeedSource> {
        self.files
            .values()
            .flat_map(|f| f.sources.iter().cloned())
            .collect()
    }
}

fn category_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    let read_err = |source| ConfigError::Read {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if is_json(&path) {
            out.push(path);
        }
    }
    Ok(())
}

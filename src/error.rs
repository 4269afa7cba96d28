//! Error types for the collector and publisher.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors loading or writing feed source files and settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to marshal config data: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("category {category} is defined by both {first} and {second}")]
    DuplicateCategory {
        category: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors reading or writing the latest-items store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read latest items file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse latest items JSON {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to marshal latest items: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write latest items file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors fetching or decoding a single source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not generate feed URL for {0}")]
    UnresolvableUrl(String),

    #[error("failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} when fetching {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode {format}: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    #[error("{0}")]
    Empty(String),
}

/// One partial failure recorded during a collect run.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to fetch latest item for {source_name} ({category}): {error}")]
    Fetch {
        source_name: String,
        category: String,
        #[source]
        error: FetchError,
    },

    #[error("failed to update config file for {category}: {error}")]
    ConfigWrite {
        category: String,
        #[source]
        error: ConfigError,
    },

    #[error("failed to fetch hot entries: {0}")]
    HotEntries(#[source] FetchError),
}

/// Every partial failure of a collect run, in the order they happened.
#[derive(Debug, Default)]
pub struct ProcessErrors(Vec<ProcessError>);

impl ProcessErrors {
    pub fn push(&mut self, error: ProcessError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessError> {
        self.0.iter()
    }

    pub fn into_result(self) -> Result<(), ProcessErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ProcessErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no errors during processing"),
            [only] => write!(f, "encountered 1 error during processing: {}", only),
            [first, rest @ ..] => write!(
                f,
                "encountered {} errors during processing: {} (and {} more)",
                rest.len() + 1,
                first,
                rest.len()
            ),
        }
    }
}

impl std::error::Error for ProcessErrors {}

impl<'a> IntoIterator for &'a ProcessErrors {
    type Item = &'a ProcessError;
    type IntoIter = std::slice::Iter<'a, ProcessError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors from the publish job.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to render digest: {0}")]
    Render(#[from] askama::Error),

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

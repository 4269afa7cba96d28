use std::fmt;

use serde::{Deserialize, Serialize};

/// The platform a feed source is hosted on.
///
/// Determines both the endpoint URL built from `feedUrl` and the wire format
/// of the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceType {
    Zenn,
    Note,
    Qiita,
    Hatena,
    Scrapbox,
    Connpass,
    /// `feedUrl` is already an RSS endpoint.
    CategoryIsUrl,
    /// `feedUrl` is already an Atom endpoint.
    CategoryIsAtomUrl,
    GithubIssues,
    /// A type string this build does not know. Kept verbatim so the config
    /// file is written back unchanged.
    Unknown(String),
}

impl SourceType {
    pub fn as_str(&self) -> &str {
        match self {
            SourceType::Zenn => "zenn",
            SourceType::Note => "note",
            SourceType::Qiita => "qiita",
            SourceType::Hatena => "hatena",
            SourceType::Scrapbox => "scrapbox",
            SourceType::Connpass => "connpass",
            SourceType::CategoryIsUrl => "categoryIsUrl",
            SourceType::CategoryIsAtomUrl => "categoryIsAtomUrl",
            SourceType::GithubIssues => "github-issues",
            SourceType::Unknown(other) => other.as_str(),
        }
    }

    /// Whether the endpoint serves Atom rather than RSS.
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            SourceType::Qiita | SourceType::Connpass | SourceType::CategoryIsAtomUrl
        )
    }
}

impl From<String> for SourceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "zenn" => SourceType::Zenn,
            "note" => SourceType::Note,
            "qiita" => SourceType::Qiita,
            "hatena" => SourceType::Hatena,
            "scrapbox" => SourceType::Scrapbox,
            "connpass" => SourceType::Connpass,
            "categoryIsUrl" => SourceType::CategoryIsUrl,
            "categoryIsAtomUrl" => SourceType::CategoryIsAtomUrl,
            "github-issues" => SourceType::GithubIssues,
            _ => SourceType::Unknown(value),
        }
    }
}

impl From<SourceType> for String {
    fn from(value: SourceType) -> Self {
        match value {
            SourceType::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured publication endpoint to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceType,
    #[serde(rename = "feedUrl")]
    pub feed_url: String,
    /// Link of the most recent item seen for this source.
    #[serde(rename = "latestLink", default)]
    pub latest_link: String,
    /// Stem of the file this source was loaded from. Never serialized.
    #[serde(skip)]
    pub category: String,
}

/// Top-level shape of a feed source file: `{"data": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FeedFile {
    #[serde(default)]
    pub data: Vec<FeedSource>,
}

/// A newly discovered item waiting to be published. Identified by `link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredItem {
    pub title: String,
    pub link: String,
    pub category: String,
}

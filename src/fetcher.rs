use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::FetchError;
use crate::hatena;
use crate::models::{DiscoveredItem, FeedSource, SourceType};
use crate::parser;

/// Base URL of the public GitHub REST API.
pub const GITHUB_API: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Endpoint for a source, or `None` when the type has no known URL.
pub fn resolve_url(kind: &SourceType, feed_url: &str) -> Option<String> {
    resolve_url_with(kind, feed_url, GITHUB_API)
}

/// [`resolve_url`] against a specific GitHub API base.
pub fn resolve_url_with(kind: &SourceType, feed_url: &str, github_api: &str) -> Option<String> {
    let url = match kind {
        SourceType::Zenn => format!("https://zenn.dev/{}/feed", feed_url),
        SourceType::Note => format!("https://note.com/{}/rss", feed_url),
        SourceType::Qiita => format!("https://qiita.com/{}/feed", feed_url),
        SourceType::Hatena => format!("{}/rss", feed_url),
        SourceType::Scrapbox => format!("https://scrapbox.io/api/feed/{}", feed_url),
        SourceType::Connpass => format!("https://{}.connpass.com/ja.atom", feed_url),
        SourceType::CategoryIsUrl | SourceType::CategoryIsAtomUrl => feed_url.to_string(),
        SourceType::GithubIssues => format!(
            "{}/repos/{}/issues?state=open&sort=created&direction=desc",
            github_api.trim_end_matches('/'),
            feed_url
        ),
        SourceType::Unknown(_) => return None,
    };
    Some(url)
}

#[derive(Debug, Deserialize)]
struct GitHubIssue {
    title: String,
    html_url: String,
}

pub struct Fetcher {
    client: Client,
    github_api: String,
    hatena_hotentry: String,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.http.timeout_secs))
            .user_agent(settings.http.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            github_api: settings.endpoints.github_api.clone(),
            hatena_hotentry: settings.endpoints.hatena_hotentry.clone(),
        })
    }

    /// Fetch a source and return its most recent item.
    pub async fn fetch_latest_item(&self, source: &FeedSource) -> Result<DiscoveredItem, FetchError> {
        let url = resolve_url_with(&source.kind, &source.feed_url, &self.github_api)
            .ok_or_else(|| FetchError::UnresolvableUrl(source.name.clone()))?;

        if source.kind == SourceType::GithubIssues {
            return self.fetch_latest_issue(source, &url).await;
        }

        info!("Fetching feed: {} ({})", source.name, url);
        let body = self.send(self.client.get(&url), &url).await?;

        if source.kind.is_atom() {
            parser::latest_atom_entry(&body, &source.category)
        } else {
            parser::latest_rss_item(&body, &source.category)
        }
    }

    /// Issues come back newest first, so the head of the list is the latest.
    async fn fetch_latest_issue(
        &self,
        source: &FeedSource,
        url: &str,
    ) -> Result<DiscoveredItem, FetchError> {
        info!("Fetching GitHub issues: {} ({})", source.name, url);
        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        let body = self.send(request, url).await?;

        let issues: Vec<GitHubIssue> =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode {
                format: "GitHub issues JSON",
                message: e.to_string(),
            })?;

        let latest = issues
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Empty(format!("no issues found for {}", source.feed_url)))?;

        Ok(DiscoveredItem {
            title: latest.title.trim().to_string(),
            link: latest.html_url.trim().to_string(),
            category: source.category.clone(),
        })
    }

    /// Fetch the Hatena Bookmark technology hot entries and keep the ones
    /// that clear their bookmark threshold.
    pub async fn fetch_hot_entries(&self) -> Result<Vec<DiscoveredItem>, FetchError> {
        info!("Fetching hot entries ({})", self.hatena_hotentry);
        let url = &self.hatena_hotentry;
        let body = self.send(self.client.get(url), url).await?;

        let entries = hatena::parse_hot_entries(&body)?;
        let total = entries.len();
        let accepted = hatena::filter_hot_entries(entries);
        debug!("Accepted {} of {} hot entries", accepted.len(), total);

        Ok(accepted)
    }

    /// Send `request` and return the body of a 200 response.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<String, FetchError> {
        let response = request.send().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}

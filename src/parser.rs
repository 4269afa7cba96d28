//! Decoding RSS 2.0 and Atom bodies and picking the most recent entry.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use thiserror::Error;

use crate::error::FetchError;
use crate::models::DiscoveredItem;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unable to parse date: {0}")]
pub struct DateParseError(pub String);

/// Zone-less layouts tried after RFC 2822 and RFC 3339, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// RFC 1123 without the zone, for dates whose zone abbreviation chrono does
/// not recognise (`JST`, `CET`, ...).
const RFC1123_WITHOUT_ZONE: &str = "%a, %d %b %Y %H:%M:%S";

/// Parse a feed date, trying each supported layout in order.
pub fn parse_date(raw: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(DateParseError(raw.to_string()));
    }

    // Covers RFC 1123 with named or numeric zones and one-digit days.
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive).into());
        }
    }
    if let Some((rest, zone)) = s.rsplit_once(' ') {
        if !zone.is_empty() && zone.chars().all(|c| c.is_ascii_alphabetic()) {
            if let Ok(naive) = NaiveDateTime::parse_from_str(rest, RFC1123_WITHOUT_ZONE) {
                return Ok(Utc.from_utc_datetime(&naive).into());
            }
        }
    }

    Err(DateParseError(raw.to_string()))
}

/// Date used to rank an entry. Unparseable dates rank as "now".
pub fn item_date(raw: &str) -> DateTime<FixedOffset> {
    parse_date(raw).unwrap_or_else(|_| Utc::now().into())
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(rename = "pubDate", default)]
    pub_date: String,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: String,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(default)]
    updated: String,
    #[serde(default)]
    published: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    /// The alternate link, or the first link when none is marked.
    fn link(&self) -> &str {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .map(|l| l.href.as_str())
            .unwrap_or_default()
    }

    fn date(&self) -> &str {
        if self.updated.trim().is_empty() {
            &self.published
        } else {
            &self.updated
        }
    }
}

struct Candidate<'a> {
    title: &'a str,
    link: &'a str,
    date: DateTime<FixedOffset>,
}

/// Stable sort newest first and take the head, so equal dates keep feed order.
fn newest<'a>(mut candidates: Vec<Candidate<'a>>, category: &str) -> Option<DiscoveredItem> {
    candidates.sort_by(|a, b| b.date.cmp(&a.date));
    candidates.into_iter().next().map(|c| DiscoveredItem {
        title: c.title.trim().to_string(),
        link: c.link.trim().to_string(),
        category: category.to_string(),
    })
}

/// Most recent `<item>` of an RSS 2.0 document.
pub fn latest_rss_item(body: &str, category: &str) -> Result<DiscoveredItem, FetchError> {
    let rss: Rss = from_str(body).map_err(|e| FetchError::Decode {
        format: "RSS feed",
        message: e.to_string(),
    })?;

    let candidates = rss
        .channel
        .items
        .iter()
        .map(|item| Candidate {
            title: &item.title,
            link: &item.link,
            date: item_date(&item.pub_date),
        })
        .collect();

    newest(candidates, category)
        .ok_or_else(|| FetchError::Empty("no items found in RSS feed".to_string()))
}

/// Most recent `<entry>` of an Atom document.
pub fn latest_atom_entry(body: &str, category: &str) -> Result<DiscoveredItem, FetchError> {
    let feed: AtomFeed = from_str(body).map_err(|e| FetchError::Decode {
        format: "Atom feed",
        message: e.to_string(),
    })?;

    let candidates = feed
        .entries
        .iter()
        .map(|entry| Candidate {
            title: &entry.title,
            link: entry.link(),
            date: item_date(entry.date()),
        })
        .collect();

    newest(candidates, category)
        .ok_or_else(|| FetchError::Empty("no entries found in Atom feed".to_string()))
}

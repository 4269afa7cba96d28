//! Hatena Bookmark technology hot entries.
//!
//! The hot-entry feed is an RSS 1.0 (RDF) document whose items carry a
//! `hatena:bookmarkcount` element. Entries are accepted when their bookmark
//! count clears a per-site threshold.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::FetchError;
use crate::models::DiscoveredItem;

/// Category assigned to every accepted hot entry.
pub const CATEGORY: &str = "hatena-bookmark-tech";

/// Zenn authors are followed through their own feeds already.
pub const EXCLUDED_PREFIX: &str = "https://zenn.dev/";

/// Sites held to the lower bookmark threshold.
pub const INTERESTED_SITES: &[&str] = &["https://speakerdeck.com/"];

/// Bookmark count an interested site must exceed.
pub const INTERESTED_THRESHOLD: u32 = 100;

/// Bookmark count every other site must exceed.
pub const DEFAULT_THRESHOLD: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotEntry {
    pub title: String,
    pub link: String,
    pub bookmark_count: u32,
}

#[derive(Default)]
struct HotEntryBuilder {
    title: String,
    link: String,
    bookmark_count: u32,
}

impl HotEntryBuilder {
    fn build(self) -> HotEntry {
        HotEntry {
            title: self.title,
            link: self.link,
            bookmark_count: self.bookmark_count,
        }
    }
}

/// Read every `<item>` of a hot-entry document.
pub fn parse_hot_entries(xml: &str) -> Result<Vec<HotEntry>, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current_item: Option<HotEntryBuilder> = None;
    let mut current_element = String::new();

    loop {
        let text = match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    current_item = Some(HotEntryBuilder::default());
                }
                current_element = name;
                continue;
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(builder) = current_item.take() {
                        entries.push(builder.build());
                    }
                }
                current_element.clear();
                continue;
            }
            Ok(Event::Text(e)) => e
                .unescape()
                .map_err(|e| decode_error(e.to_string()))?
                .into_owned(),
            Ok(Event::CData(e)) => String::from_utf8_lossy(&e).into_owned(),
            Ok(Event::Eof) => break,
            Err(e) => return Err(decode_error(e.to_string())),
            _ => continue,
        };

        if let Some(ref mut item) = current_item {
            match current_element.as_str() {
                "title" => item.title.push_str(&text),
                "link" => item.link.push_str(&text),
                "hatena:bookmarkcount" => item.bookmark_count = text.trim().parse().unwrap_or(0),
                _ => {}
            }
        }
    }

    Ok(entries)
}

fn decode_error(message: String) -> FetchError {
    FetchError::Decode {
        format: "Hatena Bookmark RSS feed",
        message,
    }
}

/// Whether a hot entry with this link and bookmark count is accepted.
pub fn is_accepted(link: &str, bookmark_count: u32) -> bool {
    if link.starts_with(EXCLUDED_PREFIX) {
        return false;
    }

    let interested = INTERESTED_SITES.iter().any(|site| link.starts_with(site));
    if interested {
        bookmark_count > INTERESTED_THRESHOLD
    } else {
        bookmark_count > DEFAULT_THRESHOLD
    }
}

/// Keep the accepted entries, tagged with [`CATEGORY`].
pub fn filter_hot_entries(entries: Vec<HotEntry>) -> Vec<DiscoveredItem> {
    entries
        .into_iter()
        .map(|entry| HotEntry {
            title: entry.title.trim().to_string(),
            link: entry.link.trim().to_string(),
            bookmark_count: entry.bookmark_count,
        })
        .filter(|entry| is_accepted(&entry.link, entry.bookmark_count))
        .map(|entry| DiscoveredItem {
            title: entry.title,
            link: entry.link,
            category: CATEGORY.to_string(),
        })
        .collect()
}

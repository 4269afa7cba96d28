use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::error::PublishError;
use crate::models::DiscoveredItem;
use crate::store::ItemStore;

/// Category codes with a fixed display name.
const DISPLAY_NAMES: &[(&str, &str)] = &[("hatena-bookmark-tech", "はてなブックマーク テック")];

// Values are escaped with `escape_html` before they reach the template.
#[derive(Template)]
#[template(path = "digest.html", escape = "none")]
pub struct DigestTemplate {
    pub date: String,
    pub generated_at: String,
    pub total: usize,
    pub sections: Vec<Section>,
}

pub struct Section {
    pub heading: String,
    pub links: Vec<Link>,
}

pub struct Link {
    pub href: String,
    pub title: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The store had no items; nothing was written or deleted.
    Empty,
    Written { path: PathBuf, items: usize },
}

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-friendly heading for a category code.
pub fn format_category_name(category: &str) -> String {
    if let Some((_, name)) = DISPLAY_NAMES.iter().find(|(code, _)| *code == category) {
        return name.to_string();
    }

    category
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Items grouped by category, categories in lexicographic order and items
/// stably sorted by title within each.
pub fn group_by_category(items: &[DiscoveredItem]) -> Vec<(String, Vec<DiscoveredItem>)> {
    let mut groups: BTreeMap<String, Vec<DiscoveredItem>> = BTreeMap::new();
    for item in items {
        groups
            .entry(item.category.clone())
            .or_default()
            .push(item.clone());
    }

    groups
        .into_iter()
        .map(|(category, mut items)| {
            items.sort_by(|a, b| a.title.cmp(&b.title));
            (category, items)
        })
        .collect()
}

pub fn render_digest(store: &ItemStore, now: &DateTime<Local>) -> Result<String, PublishError> {
    let sections = group_by_category(&store.items)
        .into_iter()
        .map(|(category, items)| Section {
            heading: escape_html(&format_category_name(&category)),
            links: items
                .iter()
                .map(|item| Link {
                    href: escape_html(&item.link),
                    title: escape_html(&item.title),
                })
                .collect(),
        })
        .collect();

    let template = DigestTemplate {
        date: now.format("%Y-%m-%d").to_string(),
        generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        total: store.len(),
        sections,
    };

    Ok(template.render()?)
}

/// Render the store at `store_path` into `output_dir/output_file`, then
/// delete the store.
pub fn publish(
    store_path: &Path,
    output_dir: &Path,
    output_file: &str,
) -> Result<PublishOutcome, PublishError> {
    fs::create_dir_all(output_dir).map_err(|source| PublishError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    info!("Loading latest items...");
    let store = ItemStore::load(store_path)?;

    if store.is_empty() {
        info!("No items found to publish");
        return Ok(PublishOutcome::Empty);
    }
    info!("Found {} items to publish", store.len());

    let html = render_digest(&store, &Local::now())?;

    let output_path = output_dir.join(output_file);
    info!("Saving content to {}", output_path.display());
    fs::write(&output_path, html).map_err(|source| PublishError::Write {
        path: output_path.clone(),
        source,
    })?;

    info!("Cleaning up {}", store_path.display());
    if let Err(e) = fs::remove_file(store_path) {
        warn!("Failed to remove latest items file: {}", e);
    }

    Ok(PublishOutcome::Written {
        path: output_path,
        items: store.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(title: &str, link: &str, category: &str) -> DiscoveredItem {
        DiscoveredItem {
            title: title.to_string(),
            link: link.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_format_category_name() {
        assert_eq!(format_category_name("hatena-bookmark-tech"), "はてなブックマーク テック");
        assert_eq!(format_category_name("tech-articles"), "Tech Articles");
        assert_eq!(format_category_name("golang"), "Golang");
        assert_eq!(format_category_name("machine-learning-ai"), "Machine Learning Ai");
    }

    #[test]
    fn test_format_category_name_empty_parts() {
        assert_eq!(format_category_name("a--b"), "A  B");
        assert_eq!(format_category_name(""), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Hello World"), "Hello World");
        assert_eq!(
            escape_html("<script>alert('test')</script>"),
            "&lt;script&gt;alert(&#39;test&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("A & B"), "A &amp; B");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
    }

    #[test]
    fn test_group_by_category_orders_categories_and_titles() {
        let items = vec![
            item("beta", "https://example.com/1", "z-cat"),
            item("Zulu", "https://example.com/2", "a-cat"),
            item("alpha", "https://example.com/3", "a-cat"),
            item("Alpha", "https://example.com/4", "a-cat"),
        ];

        let groups = group_by_category(&items);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "a-cat");
        assert_eq!(groups[1].0, "z-cat");

        // Byte order: uppercase before lowercase
        let titles: Vec<_> = groups[0].1.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Zulu", "alpha"]);
    }

    #[test]
    fn test_group_by_category_is_stable_for_equal_titles() {
        let items = vec![
            item("Same", "https://example.com/first", "c"),
            item("Same", "https://example.com/second", "c"),
        ];

        let groups = group_by_category(&items);
        assert_eq!(groups[0].1[0].link, "https://example.com/first");
        assert_eq!(groups[0].1[1].link, "https://example.com/second");
    }

    #[test]
    fn test_render_digest() {
        let store = ItemStore {
            items: vec![
                item("Test Article 1", "https://example.com/article1", "tech-articles"),
                item("Test Article 2", "https://example.com/article2", "hatena-bookmark-tech"),
            ],
        };
        let now = Local::now();

        let html = render_digest(&store, &now).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(&format!("<h1>Tech Feed Weekly - {}</h1>", now.format("%Y-%m-%d"))));
        assert!(html.contains("<h2>Tech Articles</h2>"));
        assert!(html.contains("<h2>はてなブックマーク テック</h2>"));
        assert!(html.contains(r#"<a href="https://example.com/article1">Test Article 1</a>"#));
        assert!(html.contains(r#"<a href="https://example.com/article2">Test Article 2</a>"#));
        assert!(html.contains(&format!("Generated on {}", now.format("%Y-%m-%d %H:%M:%S"))));
        assert!(html.contains("Total items: 2"));
    }

    #[test]
    fn test_render_digest_section_order() {
        let store = ItemStore {
            items: vec![
                item("Z item", "https://example.com/z", "z-cat"),
                item("A item", "https://example.com/a", "a-cat"),
            ],
        };

        let html = render_digest(&store, &Local::now()).unwrap();

        let a = html.find("<h2>A Cat</h2>").unwrap();
        let z = html.find("<h2>Z Cat</h2>").unwrap();
        assert!(a < z);
    }

    #[test]
    fn test_render_digest_escapes_markup() {
        let store = ItemStore {
            items: vec![item("<script>", "https://example.com/?a=1&b=\"2\"", "c")],
        };

        let html = render_digest(&store, &Local::now()).unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"href="https://example.com/?a=1&amp;b=&quot;2&quot;""#));
    }

    #[test]
    fn test_publish_writes_output_and_removes_store() {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("latest-items.json");
        let output_dir = temp_dir.path().join("out");

        let mut store = ItemStore::new();
        store.add(item("Article", "https://example.com/article", "blogs"));
        store.save(&store_path).unwrap();

        let outcome = publish(&store_path, &output_dir, "newsletter.html").unwrap();

        let expected = output_dir.join("newsletter.html");
        assert_eq!(
            outcome,
            PublishOutcome::Written {
                path: expected.clone(),
                items: 1
            }
        );
        let html = fs::read_to_string(&expected).unwrap();
        assert!(html.contains("<h2>Blogs</h2>"));
        assert!(!store_path.exists());
    }

    #[test]
    fn test_publish_empty_store_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("latest-items.json");
        let output_dir = temp_dir.path().join("out");
        ItemStore::new().save(&store_path).unwrap();

        let outcome = publish(&store_path, &output_dir, "newsletter.html").unwrap();

        assert_eq!(outcome, PublishOutcome::Empty);
        assert!(store_path.exists());
        assert!(!output_dir.join("newsletter.html").exists());
    }

    #[test]
    fn test_publish_missing_store_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = publish(
            &temp_dir.path().join("missing.json"),
            temp_dir.path(),
            "newsletter.html",
        );
        assert!(matches!(result, Err(PublishError::Store(_))));
    }
}

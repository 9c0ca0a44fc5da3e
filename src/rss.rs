//! Best-effort RSS 2.0 / Atom extraction.
//!
//! This is not an XML parser: blocks and fields are pulled out with regexes,
//! which is enough for the news feeds we read and tolerant of the broken
//! markup some of them serve.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use reqwest::Url;

use crate::config::Config;
use crate::http_cache::fetch_text_cached;
use crate::http_client::http_client;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub summary: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub source: String,
}

impl FeedItem {
    pub fn published_rfc3339(&self) -> Option<String> {
        self.published
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub title: Option<String>,
    pub items: Vec<FeedItem>,
}

static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(item|entry)\b[^>]*>(.*?)</(?:item|entry)>").expect("item regex")
});
static CHANNEL_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("title regex"));
static CDATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata regex"));
// Only real tags: a bare "<" followed by a space or digit is text.
static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)</?[A-Za-z!][^>]*>").expect("tag regex"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));
static NUMERIC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("entity regex"));
static ATOM_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<link\b([^>]*?)href\s*=\s*["']([^"']+)["']([^>]*)>"#)
        .expect("atom link regex")
});
static IMAGE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?is)<media:content\b[^>]*?url\s*=\s*["']([^"']+)["']"#,
        r#"(?is)<media:thumbnail\b[^>]*?url\s*=\s*["']([^"']+)["']"#,
        r#"(?is)<enclosure\b[^>]*?url\s*=\s*["']([^"']+\.(?:jpe?g|png|webp|gif)[^"']*)["']"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("image regex"))
    .collect()
});

const FIELD_TAGS: &[&str] = &[
    "title",
    "link",
    "description",
    "summary",
    "content:encoded",
    "content",
    "pubDate",
    "published",
    "updated",
    "dc:date",
];

static FIELD_RES: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    FIELD_TAGS
        .iter()
        .map(|tag| {
            let pattern = format!(r"(?is)<{0}\b[^>]*>(.*?)</{0}>", regex::escape(tag));
            (*tag, Regex::new(&pattern).expect("field regex"))
        })
        .collect()
});

/// Fetches one feed through the shared cache and parses it.
pub fn fetch_feed(cfg: &Config, url: &str) -> Result<Feed> {
    let client = http_client(cfg.http_timeout)?;
    debug!("GET {url}");
    let body = fetch_text_cached(client, url, &[], cfg.http_cache)
        .with_context(|| format!("feed {url} request failed"))?;
    Ok(parse_feed(&body, url))
}

/// Fetches every feed on a bounded pool; results keep the input order.
pub fn fetch_feeds(cfg: &Config, urls: &[String]) -> Vec<(String, Result<Feed>)> {
    let action = || {
        urls.par_iter()
            .map(|url| (url.clone(), fetch_feed(cfg, url)))
            .collect::<Vec<_>>()
    };
    match rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.fetch_parallelism)
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

/// Flattens fetched feeds, logging the failures. `None` when every feed failed.
pub fn collect_items(results: Vec<(String, Result<Feed>)>) -> Option<Vec<FeedItem>> {
    let total = results.len();
    let mut failed = 0usize;
    let mut items = Vec::new();
    for (url, result) in results {
        match result {
            Ok(feed) => items.extend(feed.items),
            Err(err) => {
                warn!("feed {url} failed: {err:#}");
                failed += 1;
            }
        }
    }
    if total > 0 && failed == total {
        None
    } else {
        Some(items)
    }
}

pub fn parse_feed(raw: &str, feed_url: &str) -> Feed {
    let head_end = ITEM_RE.find(raw).map(|m| m.start()).unwrap_or(raw.len());
    let title = CHANNEL_TITLE_RE
        .captures(&raw[..head_end])
        .map(|c| clean_text(&c[1]))
        .filter(|t| !t.is_empty());
    let source = title.clone().unwrap_or_else(|| host_label(feed_url));

    let items = ITEM_RE
        .captures_iter(raw)
        .filter_map(|caps| parse_item(&caps[2], &source))
        .collect();

    Feed { title, items }
}

fn parse_item(block: &str, source: &str) -> Option<FeedItem> {
    let title = field_text(block, &["title"]).map(|t| clean_text(&t))?;
    if title.is_empty() {
        return None;
    }
    let link = field_text(block, &["link"])
        .map(|l| clean_text(&l))
        .filter(|l| !l.is_empty())
        .or_else(|| atom_link(block))?;

    let summary = field_text(block, &["description", "summary", "content:encoded", "content"])
        .map(|s| clean_text(&s))
        .filter(|s| !s.is_empty());
    let published = field_text(block, &["pubDate", "published", "updated", "dc:date"])
        .and_then(|d| parse_date(&clean_text(&d)));
    let image = IMAGE_RES
        .iter()
        .find_map(|re| re.captures(block).map(|c| decode_entities(&c[1])));

    Some(FeedItem {
        title,
        link,
        summary,
        published,
        image,
        source: source.to_string(),
    })
}

fn field_text(block: &str, tags: &[&str]) -> Option<String> {
    tags.iter().find_map(|tag| {
        FIELD_RES
            .get(tag)
            .and_then(|re| re.captures(block))
            .map(|c| c[1].to_string())
    })
}

/// Atom `<link href=...>`, preferring rel="alternate" or no rel.
fn atom_link(block: &str) -> Option<String> {
    let mut fallback = None;
    for caps in ATOM_LINK_RE.captures_iter(block) {
        let attrs = format!("{} {}", &caps[1], &caps[3]).to_ascii_lowercase();
        let href = decode_entities(&caps[2]);
        if !attrs.contains("rel=") || attrs.contains("alternate") {
            return Some(href);
        }
        fallback.get_or_insert(href);
    }
    fallback
}

pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// CDATA unwrapped, entities decoded, tags stripped, whitespace collapsed.
pub fn clean_text(raw: &str) -> String {
    let unwrapped = CDATA_RE.replace_all(raw, "$1");
    let decoded = decode_entities(&unwrapped);
    let stripped = HTML_TAG_RE.replace_all(&decoded, " ");
    WS_RE.replace_all(stripped.trim(), " ").into_owned()
}

pub fn decode_entities(raw: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(raw, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_default()
    });
    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Cuts on a word boundary and appends an ellipsis when shortened.
pub fn truncate_summary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > max_chars / 2 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == '.'))
}

/// Drops repeated links and titles, newest first (undated last), then caps.
pub fn dedup_and_sort(mut items: Vec<FeedItem>, limit: usize) -> Vec<FeedItem> {
    items.sort_by(|a, b| match (a.published, b.published) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    let mut seen_links = HashSet::new();
    let mut seen_titles = HashSet::new();
    items.retain(|item| {
        let link = item.link.trim_end_matches('/').to_string();
        let title = item.title.to_lowercase();
        seen_links.insert(link) && seen_titles.insert(title)
    });
    items.truncate(limit);
    items
}

fn host_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&#8217;s &#x2014; &quot;ok&quot;"), "’s — \"ok\"");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn clean_text_strips_markup() {
        let raw = "<![CDATA[<p>Late <b>winner</b>\n  at the   Emirates</p>]]>";
        assert_eq!(clean_text(raw), "Late winner at the Emirates");
        assert_eq!(clean_text("&lt;p&gt;Escaped&lt;/p&gt;"), "Escaped");
    }

    #[test]
    fn escaped_angle_brackets_in_text_survive() {
        let raw = "Spurs &lt; Arsenal? Not for long &gt; says Ange";
        assert_eq!(clean_text(raw), "Spurs < Arsenal? Not for long > says Ange");
        assert_eq!(clean_text("Goals &lt;3 and xG &gt;2"), "Goals <3 and xG >2");
        assert_eq!(clean_text("<br/>Before &lt;b&gt;bold&lt;/b&gt;"), "Before bold");

        let feed = parse_feed(
            "<item><title>Spurs &lt; Arsenal? Not for long &gt; says Ange</title>\
             <link>https://x.example/1</link></item>",
            "https://x.example/rss",
        );
        assert_eq!(feed.items[0].title, "Spurs < Arsenal? Not for long > says Ange");
    }

    #[test]
    fn truncates_on_word_boundary() {
        let text = "one two three four five six seven eight nine ten";
        let out = truncate_summary(text, 20);
        assert_eq!(out, "one two three four…");
        assert_eq!(truncate_summary("short", 20), "short");
    }

    #[test]
    fn dates_parse_both_formats() {
        let a = parse_date("Sun, 18 Oct 2026 10:00:00 GMT").unwrap();
        let b = parse_date("2026-10-18T11:00:00+01:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn host_label_drops_www() {
        assert_eq!(host_label("https://www.example.com/rss"), "example.com");
    }
}

use anyhow::{Result, anyhow};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::rss::{self, FeedItem};

pub const SUMMARY_MAX_CHARS: usize = 220;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

pub fn generate(cfg: &Config) -> Result<Vec<NewsItem>> {
    let results = rss::fetch_feeds(cfg, &cfg.news_feeds);
    let items = rss::collect_items(results).ok_or_else(|| anyhow!("every news feed failed"))?;
    let news = build_news(items, cfg.news_limit);
    if news.is_empty() {
        return Err(anyhow!("news feeds returned no items"));
    }
    info!("news: {} items", news.len());
    Ok(news)
}

pub fn build_news(items: Vec<FeedItem>, limit: usize) -> Vec<NewsItem> {
    rss::dedup_and_sort(items, limit)
        .into_iter()
        .map(|item| NewsItem {
            published: item.published_rfc3339(),
            summary: item
                .summary
                .as_deref()
                .map(|s| rss::truncate_summary(s, SUMMARY_MAX_CHARS)),
            title: item.title,
            link: item.link,
            source: item.source,
            image: item.image,
        })
        .collect()
}

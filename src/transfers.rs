use anyhow::{Result, anyhow};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::news::SUMMARY_MAX_CHARS;
use crate::rss::{self, FeedItem};

static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(transfers?|sign(s|ed|ing)?|loan(ed)?|deal|bid|fee|",
        r"joins?|move|agree[sd]?)\b"
    ))
    .expect("keyword regex")
});
static DONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(completes?|completed|signs|signed|joins|joined|",
        r"confirmed|official|seals?|sealed)\b"
    ))
    .expect("done regex")
});
static FEE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([£€$])\s?(\d+(?:\.\d+)?)\s?(m\b|million\b|bn\b|billion\b|k\b)")
        .expect("fee regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Done,
    Rumour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItem {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    pub status: TransferStatus,
}

pub fn generate(cfg: &Config) -> Result<Vec<TransferItem>> {
    let results = rss::fetch_feeds(cfg, &cfg.transfer_feeds);
    let items =
        rss::collect_items(results).ok_or_else(|| anyhow!("every transfer feed failed"))?;
    let transfers = build_transfers(items, cfg.transfers_limit);
    if transfers.is_empty() {
        return Err(anyhow!("no transfer stories in feeds"));
    }
    info!("transfers: {} items", transfers.len());
    Ok(transfers)
}

pub fn build_transfers(items: Vec<FeedItem>, limit: usize) -> Vec<TransferItem> {
    let relevant: Vec<FeedItem> = items.into_iter().filter(is_transfer_story).collect();
    rss::dedup_and_sort(relevant, limit)
        .into_iter()
        .map(|item| {
            let text = format!("{} {}", item.title, item.summary.as_deref().unwrap_or_default());
            TransferItem {
                fee: extract_fee(&text),
                status: classify(&text),
                published: item.published_rfc3339(),
                summary: item
                    .summary
                    .as_deref()
                    .map(|s| rss::truncate_summary(s, SUMMARY_MAX_CHARS)),
                title: item.title,
                link: item.link,
                source: item.source,
            }
        })
        .collect()
}

pub fn is_transfer_story(item: &FeedItem) -> bool {
    KEYWORD_RE.is_match(&item.title)
        || item
            .summary
            .as_deref()
            .is_some_and(|s| KEYWORD_RE.is_match(s))
}

/// First money amount in the text, normalized to e.g. "£45m" or "€1.2bn".
pub fn extract_fee(text: &str) -> Option<String> {
    let caps = FEE_RE.captures(text)?;
    let unit = match caps[3].to_ascii_lowercase().as_str() {
        "m" | "million" => "m",
        "bn" | "billion" => "bn",
        _ => "k",
    };
    Some(format!("{}{}{}", &caps[1], &caps[2], unit))
}

/// Completion language in the headline or summary marks a done deal.
pub fn classify(text: &str) -> TransferStatus {
    if DONE_RE.is_match(text) {
        TransferStatus::Done
    } else {
        TransferStatus::Rumour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fees_are_normalized() {
        assert_eq!(extract_fee("Arsenal bid £45m for striker").as_deref(), Some("£45m"));
        assert_eq!(extract_fee("a €30 million deal").as_deref(), Some("€30m"));
        assert_eq!(extract_fee("worth $12.5M plus add-ons").as_deref(), Some("$12.5m"));
        assert_eq!(extract_fee("a £1.2bn takeover").as_deref(), Some("£1.2bn"));
        assert_eq!(extract_fee("no money mentioned"), None);
    }

    #[test]
    fn completion_language_marks_done() {
        assert_eq!(classify("Midfielder completes move to Napoli"), TransferStatus::Done);
        assert_eq!(classify("Chelsea confirm keeper has signed"), TransferStatus::Done);
        assert_eq!(classify("United monitoring Bundesliga winger"), TransferStatus::Rumour);
    }

    #[test]
    fn summary_wording_can_confirm_a_deal() {
        let item = FeedItem {
            title: "Wolves striker heads to Italy".to_string(),
            link: "https://x.example/wolves".to_string(),
            summary: Some("The club has confirmed the transfer is official.".to_string()),
            published: None,
            image: None,
            source: "x.example".to_string(),
        };
        let transfers = build_transfers(vec![item], 5);
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].status, TransferStatus::Done);
        assert_eq!(transfers[0].fee, None);
    }
}

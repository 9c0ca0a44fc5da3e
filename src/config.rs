use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_FOOTBALL_DATA_BASE_URL: &str = "https://api.football-data.org/v4";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OUTPUT_DIR: &str = "public/data";
const DEFAULT_COMPETITIONS: &[&str] = &["PL", "PD", "BL1", "SA", "FL1", "CL"];
const DEFAULT_NEWS_FEEDS: &[&str] = &[
    "https://feeds.bbci.co.uk/sport/football/rss.xml",
    "https://www.theguardian.com/football/rss",
    "https://www.espn.com/espn/rss/soccer/news",
];
const DEFAULT_TRANSFER_FEEDS: &[&str] = &[
    "https://feeds.bbci.co.uk/sport/football/rss.xml",
    "https://www.theguardian.com/football/transfer-window/rss",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub football_data_api_key: Option<String>,
    pub football_data_base_url: String,
    pub competitions: Vec<String>,
    pub scores_days_back: i64,
    pub scores_limit: usize,
    pub upcoming_days_ahead: i64,
    pub upcoming_limit: usize,
    pub news_feeds: Vec<String>,
    pub news_limit: usize,
    pub transfer_feeds: Vec<String>,
    pub transfers_limit: usize,
    pub signals_fixtures: usize,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub output_dir: PathBuf,
    pub keep_stale: bool,
    pub http_timeout: Duration,
    pub request_spacing: Duration,
    pub fetch_parallelism: usize,
    pub http_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let num = |key: &str, default: u64, lo: u64, hi: u64| {
            get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
                .clamp(lo, hi)
        };
        let flag = |key: &str, default: bool| {
            get(key)
                .map(|v| {
                    let t = v.to_ascii_lowercase();
                    !(t == "0" || t == "false" || t == "off" || t == "no")
                })
                .unwrap_or(default)
        };

        let competitions = get("COMPETITIONS")
            .map(|raw| split_list(&raw.to_ascii_uppercase()))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| to_owned_list(DEFAULT_COMPETITIONS));
        let news_feeds = get("NEWS_FEEDS")
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| to_owned_list(DEFAULT_NEWS_FEEDS));
        let transfer_feeds = get("TRANSFER_FEEDS")
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| to_owned_list(DEFAULT_TRANSFER_FEEDS));

        Self {
            football_data_api_key: get("FOOTBALL_DATA_API_KEY"),
            football_data_base_url: get("FOOTBALL_DATA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FOOTBALL_DATA_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            competitions,
            scores_days_back: num("SCORES_DAYS_BACK", 3, 0, 14) as i64,
            scores_limit: num("SCORES_LIMIT", 40, 1, 200) as usize,
            upcoming_days_ahead: num("UPCOMING_DAYS_AHEAD", 7, 1, 14) as i64,
            upcoming_limit: num("UPCOMING_LIMIT", 40, 1, 200) as usize,
            news_feeds,
            news_limit: num("NEWS_LIMIT", 30, 1, 200) as usize,
            transfer_feeds,
            transfers_limit: num("TRANSFERS_LIMIT", 25, 1, 200) as usize,
            signals_fixtures: num("SIGNALS_FIXTURES", 8, 1, 30) as usize,
            llm_api_key: get("LLM_API_KEY"),
            llm_base_url: get("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            output_dir: get("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            keep_stale: flag("KEEP_STALE", true),
            http_timeout: Duration::from_secs(num("HTTP_TIMEOUT_SECS", 10, 2, 120)),
            request_spacing: Duration::from_millis(num("REQUEST_SPACING_MS", 0, 0, 60_000)),
            fetch_parallelism: num("FETCH_PARALLELISM", 6, 2, 32) as usize,
            http_cache: flag("HTTP_CACHE", true),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split([',', ';', ' ', '\n']) {
        let part = part.trim();
        if part.is_empty() || out.iter().any(|seen| seen == part) {
            continue;
        }
        out.push(part.to_string());
    }
    out
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::default();
        assert!(cfg.football_data_api_key.is_none());
        assert_eq!(cfg.competitions, vec!["PL", "PD", "BL1", "SA", "FL1", "CL"]);
        assert_eq!(cfg.output_dir, PathBuf::from("public/data"));
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert!(cfg.keep_stale);
        assert_eq!(cfg.fetch_parallelism, 6);
    }

    #[test]
    fn lists_are_split_and_deduped() {
        let cfg = config_with(&[("COMPETITIONS", "pl, cl;PL  sa")]);
        assert_eq!(cfg.competitions, vec!["PL", "CL", "SA"]);
    }

    #[test]
    fn numbers_are_clamped_and_blank_keys_ignored() {
        let cfg = config_with(&[
            ("FETCH_PARALLELISM", "500"),
            ("UPCOMING_DAYS_AHEAD", "0"),
            ("LLM_API_KEY", "   "),
            ("KEEP_STALE", "off"),
            ("FOOTBALL_DATA_BASE_URL", "http://localhost:9000/v4/"),
        ]);
        assert_eq!(cfg.fetch_parallelism, 32);
        assert_eq!(cfg.upcoming_days_ahead, 1);
        assert!(cfg.llm_api_key.is_none());
        assert!(!cfg.keep_stale);
        assert_eq!(cfg.football_data_base_url, "http://localhost:9000/v4");
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "netthud";
const CACHE_FILE: &str = "http_cache.json";
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 500;
const ERROR_BODY_PREVIEW: usize = 200;
const MAX_ENTRY_AGE_SECS: u64 = 3 * 24 * 60 * 60;

static CACHE: Mutex<Option<HttpCacheFile>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

enum Attempt {
    Done(String),
    Retry(anyhow::Error),
    Fail(anyhow::Error),
}

/// GET `url` as text, revalidating against the on-disk cache when `use_cache` is set.
///
/// Network errors, 429 and 5xx are retried with a fixed exponential backoff;
/// any other non-2xx status fails at once.
pub fn fetch_text_cached(
    client: &Client,
    url: &str,
    extra_headers: &[(&str, &str)],
    use_cache: bool,
) -> Result<String> {
    let cached_entry = if use_cache {
        let mut guard = CACHE.lock().map_err(|_| anyhow!("http cache lock poisoned"))?;
        let cache = guard.get_or_insert_with(load_cache_file);
        cache.entries.get(url).cloned()
    } else {
        None
    };

    let mut last_err = None;
    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = backoff_delay(attempt - 1);
            debug!("retrying {url} in {}ms", delay.as_millis());
            thread::sleep(delay);
        }
        match fetch_once(client, url, extra_headers, cached_entry.as_ref(), use_cache) {
            Attempt::Done(body) => return Ok(body),
            Attempt::Fail(err) => return Err(err),
            Attempt::Retry(err) => {
                warn!("attempt {} for {url} failed: {err}", attempt + 1);
                last_err = Some(err);
            }
        }
    }
    let err = last_err.unwrap_or_else(|| anyhow!("request failed"));
    Err(err.context(format!("giving up on {url} after {MAX_ATTEMPTS} attempts")))
}

fn fetch_once(
    client: &Client,
    url: &str,
    extra_headers: &[(&str, &str)],
    cached_entry: Option<&CacheEntry>,
    use_cache: bool,
) -> Attempt {
    let mut req = client.get(url);
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }
    if let Some(entry) = cached_entry {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = match req.send() {
        Ok(resp) => resp,
        Err(err) => return Attempt::Retry(anyhow::Error::new(err).context("request failed")),
    };
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        return match cached_entry {
            Some(entry) => {
                debug!("{url} not modified, serving cached body");
                if use_cache {
                    let mut entry = entry.clone();
                    entry.fetched_at = now_secs();
                    refresh_cache_entry(url, entry);
                }
                Attempt::Done(entry.body.clone())
            }
            None => Attempt::Fail(anyhow!("received 304 without cache body")),
        };
    }

    let (etag, last_modified) = validators(&resp);
    let body = match resp.text() {
        Ok(body) => body,
        Err(err) => {
            return Attempt::Retry(anyhow::Error::new(err).context("failed reading body"));
        }
    };
    if !status.is_success() {
        let err = anyhow!("http {}: {}", status, preview(&body));
        return if is_retryable(status) {
            Attempt::Retry(err)
        } else {
            Attempt::Fail(err)
        };
    }

    if use_cache {
        let entry = CacheEntry {
            body: body.clone(),
            etag,
            last_modified,
            fetched_at: now_secs(),
        };
        refresh_cache_entry(url, entry);
    }
    Attempt::Done(body)
}

fn validators(resp: &Response) -> (Option<String>, Option<String>) {
    let headers = resp.headers();
    let etag = headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let last_modified = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    (etag, last_modified)
}

pub fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub fn backoff_delay(retry: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS * 2u64.pow(retry))
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= ERROR_BODY_PREVIEW {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(ERROR_BODY_PREVIEW).collect();
    out.push_str("...");
    out
}

fn refresh_cache_entry(key: &str, entry: CacheEntry) {
    let Ok(mut guard) = CACHE.lock() else {
        return;
    };
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(key.to_string(), entry);
    prune_stale(cache, now_secs());
    if let Err(err) = save_cache_file(cache) {
        debug!("http cache not saved: {err}");
    }
}

fn load_cache_file() -> HttpCacheFile {
    let Some(path) = cache_path() else {
        return HttpCacheFile::default();
    };
    let Ok(raw) = fs::read_to_string(path) else {
        return HttpCacheFile::default();
    };
    let mut cache = serde_json::from_str::<HttpCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return HttpCacheFile::default();
    }
    prune_stale(&mut cache, now_secs());
    cache
}

/// Drops entries not refreshed within `MAX_ENTRY_AGE_SECS`. Date-windowed
/// URLs change daily, so old keys are never hit again.
fn prune_stale(cache: &mut HttpCacheFile, now: u64) {
    let before = cache.entries.len();
    cache
        .entries
        .retain(|_, entry| now.saturating_sub(entry.fetched_at) <= MAX_ENTRY_AGE_SECS);
    let dropped = before - cache.entries.len();
    if dropped > 0 {
        debug!("http cache: pruned {dropped} stale entries");
    }
}

fn save_cache_file(cache: &HttpCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).context("create http cache dir")?;
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, &path).context("swap http cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

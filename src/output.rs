use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Demo,
}

/// Wrapper every published file shares.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub generated_at: String,
    pub source: Source,
    pub items: Vec<T>,
}

impl<T> Envelope<T> {
    pub fn new(source: Source, items: Vec<T>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            source,
            items,
        }
    }
}

/// Serializes the envelope and swaps it into `dir/file` atomically.
pub fn write_feed<T: Serialize>(
    dir: &Path,
    file: &str,
    source: Source,
    items: Vec<T>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(file);
    let tmp = path.with_extension("json.tmp");
    let envelope = Envelope::new(source, items);
    let json = serde_json::to_string_pretty(&envelope)
        .with_context(|| format!("serialize {file}"))?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("swap {}", path.display()))?;
    Ok(path)
}

/// Source of an already-published file, if it exists and parses.
pub fn existing_source(path: &Path) -> Option<Source> {
    #[derive(Deserialize)]
    struct Head {
        source: Source,
    }
    let raw = fs::read_to_string(path).ok()?;
    let head = serde_json::from_str::<Head>(&raw).ok()?;
    Some(head.source)
}

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::config::Config;
use crate::output::{self, Source};
use crate::{demo, leagues, news, scores, signals, transfers, upcoming};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Scores,
    Leagues,
    Upcoming,
    News,
    Transfers,
    Signals,
}

impl FeedKind {
    pub const ALL: [FeedKind; 6] = [
        FeedKind::Scores,
        FeedKind::Leagues,
        FeedKind::Upcoming,
        FeedKind::News,
        FeedKind::Transfers,
        FeedKind::Signals,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            FeedKind::Scores => "scores.json",
            FeedKind::Leagues => "leagues.json",
            FeedKind::Upcoming => "upcoming.json",
            FeedKind::News => "news.json",
            FeedKind::Transfers => "transfers.json",
            FeedKind::Signals => "signals.json",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.file_name().trim_end_matches(".json");
        f.write_str(name)
    }
}

/// What happened to one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Live { path: PathBuf, items: usize },
    Demo { path: PathBuf, items: usize },
    KeptStale { path: PathBuf },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Live { path, items } => write!(f, "{} ({items} live)", path.display()),
            Outcome::Demo { path, items } => write!(f, "{} ({items} demo)", path.display()),
            Outcome::KeptStale { path } => {
                write!(f, "{} (kept previous live data)", path.display())
            }
        }
    }
}

/// Runs one generator and publishes its file. Only write failures are errors;
/// fetch failures degrade to stale or demo content.
pub fn run_feed(
    kind: FeedKind,
    cfg: &Config,
    demo_only: bool,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    let today = now.date_naive();
    let publisher = Publisher {
        dir: cfg.output_dir.as_path(),
        keep_stale: cfg.keep_stale,
        demo_only,
    };
    match kind {
        FeedKind::Scores => publisher.publish(
            kind,
            || scores::generate(cfg, today),
            || demo::scores(now),
        ),
        FeedKind::Leagues => publisher.publish(kind, || leagues::generate(cfg), demo::leagues),
        FeedKind::Upcoming => publisher.publish(
            kind,
            || upcoming::generate(cfg, today),
            || demo::upcoming(now),
        ),
        FeedKind::News => publisher.publish(kind, || news::generate(cfg), || demo::news(now)),
        FeedKind::Transfers => publisher.publish(
            kind,
            || transfers::generate(cfg),
            || demo::transfers(now),
        ),
        FeedKind::Signals => publisher.publish(
            kind,
            || signals::generate(cfg, today),
            || demo::signals(now),
        ),
    }
}

pub struct Publisher<'a> {
    pub dir: &'a Path,
    pub keep_stale: bool,
    pub demo_only: bool,
}

impl Publisher<'_> {
    pub fn publish<T, L, D>(&self, kind: FeedKind, live: L, demo: D) -> Result<Outcome>
    where
        T: Serialize,
        L: FnOnce() -> Result<Vec<T>>,
        D: FnOnce() -> Vec<T>,
    {
        if !self.demo_only {
            match live() {
                Ok(items) if !items.is_empty() => {
                    let count = items.len();
                    let path =
                        output::write_feed(self.dir, kind.file_name(), Source::Live, items)?;
                    info!("{kind}: wrote {count} live items to {}", path.display());
                    return Ok(Outcome::Live { path, items: count });
                }
                Ok(_) => warn!("{kind}: live fetch returned nothing"),
                Err(err) => warn!("{kind}: live fetch failed: {err:#}"),
            }

            let path = self.dir.join(kind.file_name());
            if self.keep_stale && output::existing_source(&path) == Some(Source::Live) {
                warn!("{kind}: keeping previous live file {}", path.display());
                return Ok(Outcome::KeptStale { path });
            }
        }

        let items = demo();
        let count = items.len();
        let path = output::write_feed(self.dir, kind.file_name(), Source::Demo, items)?;
        info!("{kind}: wrote {count} demo items to {}", path.display());
        Ok(Outcome::Demo { path, items: count })
    }
}

use std::fs;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use netthud::config::Config;
use netthud::output::{self, Source};
use netthud::runner::{FeedKind, Outcome, Publisher, run_feed};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("netthud-publish-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn read_json(path: &PathBuf) -> Value {
    let raw = fs::read_to_string(path).expect("published file should be readable");
    serde_json::from_str(&raw).expect("published file should be json")
}

#[test]
fn demo_mode_writes_every_feed() {
    let dir = scratch_dir("demo");
    let mut cfg = Config::default();
    cfg.output_dir = dir.clone();
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    for kind in FeedKind::ALL {
        let outcome = run_feed(kind, &cfg, true, now).expect("demo write should succeed");
        let Outcome::Demo { path, items } = outcome else {
            panic!("{kind} should publish demo content");
        };
        assert!(items > 0, "{kind} demo is empty");
        assert_eq!(path, dir.join(kind.file_name()));

        let json = read_json(&path);
        assert_eq!(json["source"], "demo");
        assert!(json["generatedAt"].as_str().is_some_and(|s| s.ends_with('Z')));
        assert_eq!(json["items"].as_array().map(Vec::len), Some(items));
    }

    let upcoming = read_json(&dir.join("upcoming.json"));
    let first = &upcoming["items"][0];
    let sum = ["home", "draw", "away"]
        .iter()
        .map(|k| first["probabilities"][k].as_f64().unwrap())
        .sum::<f64>();
    assert!((sum - 1.0).abs() < 1e-3);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn live_items_are_published_as_live() {
    let dir = scratch_dir("live");
    let publisher = Publisher {
        dir: &dir,
        keep_stale: false,
        demo_only: false,
    };
    let outcome = publisher
        .publish(FeedKind::News, || Ok(vec!["one", "two"]), Vec::new)
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Live {
            path: dir.join("news.json"),
            items: 2
        }
    );
    assert_eq!(output::existing_source(&dir.join("news.json")), Some(Source::Live));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failed_fetch_falls_back_to_demo() {
    let dir = scratch_dir("fallback");
    let publisher = Publisher {
        dir: &dir,
        keep_stale: false,
        demo_only: false,
    };
    publisher
        .publish(FeedKind::Scores, || Ok(vec![1, 2, 3]), Vec::new)
        .unwrap();

    let outcome = publisher
        .publish(FeedKind::Scores, || Err(anyhow!("503")), || vec![9])
        .unwrap();
    assert!(matches!(outcome, Outcome::Demo { items: 1, .. }));
    assert_eq!(output::existing_source(&dir.join("scores.json")), Some(Source::Demo));

    let outcome = publisher
        .publish(FeedKind::Scores, || Ok(Vec::<u32>::new()), || vec![9, 9])
        .unwrap();
    assert!(matches!(outcome, Outcome::Demo { items: 2, .. }));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn keep_stale_preserves_previous_live_file() {
    let dir = scratch_dir("stale");
    let publisher = Publisher {
        dir: &dir,
        keep_stale: true,
        demo_only: false,
    };
    let path = dir.join("leagues.json");

    // Nothing live yet, so demo is written.
    let outcome = publisher
        .publish(FeedKind::Leagues, || Err(anyhow!("offline")), || vec!["demo"])
        .unwrap();
    assert!(matches!(outcome, Outcome::Demo { .. }));

    publisher
        .publish(FeedKind::Leagues, || Ok(vec!["live"]), Vec::new)
        .unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let outcome = publisher
        .publish(FeedKind::Leagues, || Err(anyhow!("offline")), || vec!["demo"])
        .unwrap();
    assert_eq!(outcome, Outcome::KeptStale { path: path.clone() });
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn demo_only_never_calls_live() {
    let dir = scratch_dir("demo-only");
    let publisher = Publisher {
        dir: &dir,
        keep_stale: true,
        demo_only: true,
    };
    let outcome = publisher
        .publish(
            FeedKind::Signals,
            || -> anyhow::Result<Vec<u8>> { panic!("live fetch must not run") },
            || vec![1],
        )
        .unwrap();
    assert!(matches!(outcome, Outcome::Demo { items: 1, .. }));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unwritable_output_is_an_error() {
    let dir = scratch_dir("unwritable");
    fs::create_dir_all(dir.parent().unwrap()).unwrap();
    fs::write(&dir, "a file, not a directory").unwrap();
    let publisher = Publisher {
        dir: &dir,
        keep_stale: false,
        demo_only: true,
    };
    let result = publisher.publish(FeedKind::News, || Ok(Vec::<u8>::new()), || vec![1]);
    assert!(result.is_err());
    let _ = fs::remove_file(&dir);
}

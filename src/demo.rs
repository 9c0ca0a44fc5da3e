//! Placeholder content published when a live fetch fails.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::hda;
use crate::leagues::{LeagueRow, LeagueTable};
use crate::news::NewsItem;
use crate::scores::{ScoreItem, status_label};
use crate::signals::{self, SignalItem};
use crate::transfers::{TransferItem, TransferStatus};
use crate::upcoming::{TeamRatings, UpcomingItem, published_rating};

const DEMO_COMPETITION: &str = "Demo League";
const DEMO_CODE: &str = "DEMO";
const DEMO_LINK: &str = "https://netthud.example/demo";

// (team, played, won, draw, lost, goals_for, goals_against)
const DEMO_TABLE: &[(&str, u32, u32, u32, u32, u32, u32)] = &[
    ("Northbridge", 8, 6, 1, 1, 17, 6),
    ("Harbour City", 8, 5, 2, 1, 14, 8),
    ("Eastvale", 8, 4, 2, 2, 12, 9),
    ("Rovers", 8, 3, 3, 2, 10, 9),
    ("Kingsmoor", 8, 2, 2, 4, 8, 12),
    ("Westport", 8, 0, 2, 6, 4, 21),
];

// (home, away, home_goals, away_goals, status, hours_ago)
const DEMO_RESULTS: &[(&str, &str, u32, u32, &str, i64)] = &[
    ("Rovers", "Westport", 1, 0, "IN_PLAY", 0),
    ("Northbridge", "Kingsmoor", 3, 1, "FINISHED", 20),
    ("Harbour City", "Eastvale", 2, 2, "FINISHED", 22),
    ("Westport", "Northbridge", 0, 2, "FINISHED", 70),
];

// (home, away, hours_ahead)
const DEMO_FIXTURES: &[(&str, &str, i64)] = &[
    ("Northbridge", "Harbour City", 26),
    ("Eastvale", "Rovers", 28),
    ("Westport", "Kingsmoor", 50),
];

fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn scores(now: DateTime<Utc>) -> Vec<ScoreItem> {
    DEMO_RESULTS
        .iter()
        .enumerate()
        .map(|(idx, (home, away, hg, ag, status, hours_ago))| ScoreItem {
            id: 900_000 + idx as u64,
            competition: DEMO_COMPETITION.to_string(),
            competition_code: DEMO_CODE.to_string(),
            kickoff: stamp(now - Duration::hours(*hours_ago)),
            status: status.to_string(),
            status_label: status_label(status).to_string(),
            home: home.to_string(),
            away: away.to_string(),
            home_crest: None,
            away_crest: None,
            home_score: Some(*hg),
            away_score: Some(*ag),
            winner: None,
        })
        .collect()
}

pub fn leagues() -> Vec<LeagueTable> {
    let rows = DEMO_TABLE
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let (team, played, won, draw, lost, gf, ga) = *row;
            LeagueRow {
                position: idx as u32 + 1,
                team: team.to_string(),
                tla: None,
                crest: None,
                played,
                won,
                draw,
                lost,
                goals_for: gf,
                goals_against: ga,
                goal_difference: gf as i32 - ga as i32,
                points: won * 3 + draw,
                form: None,
            }
        })
        .collect();
    vec![LeagueTable {
        code: DEMO_CODE.to_string(),
        name: DEMO_COMPETITION.to_string(),
        emblem: None,
        season: None,
        group: None,
        rows,
    }]
}

fn demo_rating(team: &str) -> f64 {
    DEMO_TABLE
        .iter()
        .find(|row| row.0 == team)
        .map(|&(_, played, won, draw, _, gf, ga)| {
            hda::team_rating(won * 3 + draw, played, gf as i32 - ga as i32, gf)
        })
        .unwrap_or(f64::NAN)
}

pub fn upcoming(now: DateTime<Utc>) -> Vec<UpcomingItem> {
    DEMO_FIXTURES
        .iter()
        .enumerate()
        .map(|(idx, (home, away, hours_ahead))| {
            let home_rating = demo_rating(home);
            let away_rating = demo_rating(away);
            let probabilities = hda::compute_hda(home_rating, away_rating);
            UpcomingItem {
                id: 910_000 + idx as u64,
                competition: DEMO_COMPETITION.to_string(),
                competition_code: DEMO_CODE.to_string(),
                kickoff: stamp(now + Duration::hours(*hours_ahead)),
                matchday: Some(9),
                home: home.to_string(),
                away: away.to_string(),
                home_crest: None,
                away_crest: None,
                probabilities,
                ratings: TeamRatings {
                    home: published_rating(home_rating),
                    away: published_rating(away_rating),
                },
                favourite: probabilities.favourite(),
            }
        })
        .collect()
}

pub fn news(now: DateTime<Utc>) -> Vec<NewsItem> {
    [
        (
            "Northbridge stretch lead at the top",
            "A late double settles a tense afternoon.",
        ),
        (
            "Westport still searching for first win",
            "The manager insists the performances are improving.",
        ),
        (
            "Harbour City and Eastvale share the points",
            "Four goals and a red card in a lively draw.",
        ),
    ]
    .iter()
    .enumerate()
    .map(|(idx, (title, summary))| NewsItem {
        title: title.to_string(),
        link: format!("{DEMO_LINK}/news/{idx}"),
        summary: Some(summary.to_string()),
        published: Some(stamp(now - Duration::hours(idx as i64 * 3))),
        source: "Net Thud".to_string(),
        image: None,
    })
    .collect()
}

pub fn transfers(now: DateTime<Utc>) -> Vec<TransferItem> {
    [
        ("Northbridge complete £18m move for Rovers winger", Some("£18m"), TransferStatus::Done),
        ("Eastvale weigh up loan bid for young keeper", None, TransferStatus::Rumour),
    ]
    .iter()
    .enumerate()
    .map(|(idx, (title, fee, status))| TransferItem {
        title: title.to_string(),
        link: format!("{DEMO_LINK}/transfers/{idx}"),
        summary: None,
        published: Some(stamp(now - Duration::hours(idx as i64 * 5))),
        source: "Net Thud".to_string(),
        fee: fee.map(str::to_string),
        status: *status,
    })
    .collect()
}

pub fn signals(now: DateTime<Utc>) -> Vec<SignalItem> {
    upcoming(now).iter().map(signals::model_signal).collect()
}

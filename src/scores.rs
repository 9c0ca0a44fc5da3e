use std::cmp::Ordering;

use anyhow::{Result, anyhow};
use chrono::{Duration, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::football_data::{ApiMatch, FootballData};

const KEEP_STATUSES: &[&str] = &["FINISHED", "IN_PLAY", "PAUSED", "AWARDED"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreItem {
    pub id: u64,
    pub competition: String,
    pub competition_code: String,
    pub kickoff: String,
    pub status: String,
    pub status_label: String,
    pub home: String,
    pub away: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_crest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_crest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

impl ScoreItem {
    pub fn is_live(&self) -> bool {
        matches!(self.status.as_str(), "IN_PLAY" | "PAUSED")
    }
}

pub fn status_label(status: &str) -> &'static str {
    match status {
        "FINISHED" => "FT",
        "IN_PLAY" => "LIVE",
        "PAUSED" => "HT",
        "AWARDED" => "AWD",
        "POSTPONED" => "PP",
        "SUSPENDED" => "SUSP",
        "CANCELLED" => "CANC",
        _ => "",
    }
}

pub fn generate(cfg: &Config, today: NaiveDate) -> Result<Vec<ScoreItem>> {
    let api = FootballData::new(cfg)?;
    let from = today - Duration::days(cfg.scores_days_back);

    let mut items = Vec::new();
    let mut errors = Vec::new();
    for code in &cfg.competitions {
        match api.fetch_competition_matches(code, from, today, None) {
            Ok(matches) => items.extend(build_score_items(code, &matches)),
            Err(err) => {
                warn!("scores: {code} fetch failed: {err:#}");
                errors.push(code.clone());
            }
        }
    }

    if items.is_empty() && !errors.is_empty() {
        return Err(anyhow!("no scores fetched ({} competitions failed)", errors.len()));
    }
    sort_scores(&mut items);
    items.truncate(cfg.scores_limit);
    info!("scores: {} items from {} competitions", items.len(), cfg.competitions.len());
    Ok(items)
}

pub fn build_score_items(code: &str, matches: &[ApiMatch]) -> Vec<ScoreItem> {
    matches
        .iter()
        .filter(|m| KEEP_STATUSES.contains(&m.status.as_str()))
        .map(|m| {
            let competition = m
                .competition
                .as_ref()
                .map(|c| c.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| code.to_string());
            ScoreItem {
                id: m.id,
                competition,
                competition_code: code.to_string(),
                kickoff: m.utc_date.clone(),
                status: m.status.clone(),
                status_label: status_label(&m.status).to_string(),
                home: m.home_team.display_name(),
                away: m.away_team.display_name(),
                home_crest: m.home_team.crest.clone(),
                away_crest: m.away_team.crest.clone(),
                home_score: m.score.full_time.home,
                away_score: m.score.full_time.away,
                winner: m.score.winner.clone(),
            }
        })
        .collect()
}

/// Live matches first, then newest kickoff first.
pub fn sort_scores(items: &mut [ScoreItem]) {
    items.sort_by(|a, b| match (a.is_live(), b.is_live()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b.kickoff.cmp(&a.kickoff).then(a.id.cmp(&b.id)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, status: &str, kickoff: &str) -> ScoreItem {
        ScoreItem {
            id,
            competition: "Premier League".to_string(),
            competition_code: "PL".to_string(),
            kickoff: kickoff.to_string(),
            status: status.to_string(),
            status_label: status_label(status).to_string(),
            home: "H".to_string(),
            away: "A".to_string(),
            home_crest: None,
            away_crest: None,
            home_score: Some(1),
            away_score: Some(0),
            winner: None,
        }
    }

    #[test]
    fn live_first_then_newest() {
        let mut items = vec![
            item(1, "FINISHED", "2026-10-17T14:00:00Z"),
            item(2, "FINISHED", "2026-10-18T16:30:00Z"),
            item(3, "PAUSED", "2026-10-19T12:00:00Z"),
            item(4, "IN_PLAY", "2026-10-19T13:00:00Z"),
        ];
        sort_scores(&mut items);
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[test]
    fn labels_cover_common_statuses() {
        assert_eq!(status_label("FINISHED"), "FT");
        assert_eq!(status_label("PAUSED"), "HT");
        assert_eq!(status_label("IN_PLAY"), "LIVE");
        assert_eq!(status_label("TIMED"), "");
    }
}

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use chrono::{Duration, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::football_data::{ApiMatch, FootballData};
use crate::hda::{self, Hda, Outcome};

const UPCOMING_STATUSES: &str = "SCHEDULED,TIMED";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRatings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingItem {
    pub id: u64,
    pub competition: String,
    pub competition_code: String,
    pub kickoff: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchday: Option<u32>,
    pub home: String,
    pub away: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_crest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_crest: Option<String>,
    pub probabilities: Hda,
    pub ratings: TeamRatings,
    pub favourite: Outcome,
}

pub fn generate(cfg: &Config, today: NaiveDate) -> Result<Vec<UpcomingItem>> {
    let mut items = collect_upcoming(cfg, today)?;
    items.truncate(cfg.upcoming_limit);
    info!("upcoming: {} fixtures", items.len());
    Ok(items)
}

/// Fixtures for every configured competition, rated and sorted by kickoff.
pub fn collect_upcoming(cfg: &Config, today: NaiveDate) -> Result<Vec<UpcomingItem>> {
    let api = FootballData::new(cfg)?;
    let to = today + Duration::days(cfg.upcoming_days_ahead);

    let mut items = Vec::new();
    let mut failed = 0usize;
    for code in &cfg.competitions {
        let matches = match api.fetch_competition_matches(code, today, to, Some(UPCOMING_STATUSES))
        {
            Ok(matches) => matches,
            Err(err) => {
                warn!("upcoming: {code} fixtures failed: {err:#}");
                failed += 1;
                continue;
            }
        };
        if matches.is_empty() {
            continue;
        }
        let ratings = match api.fetch_competition_standings(code) {
            Ok(standings) => hda::ratings_from_standings(&standings),
            Err(err) => {
                warn!("upcoming: {code} standings failed, using neutral odds: {err:#}");
                HashMap::new()
            }
        };
        items.extend(build_upcoming_items(code, &matches, &ratings));
    }

    if items.is_empty() && failed > 0 {
        return Err(anyhow!("no fixtures fetched ({failed} competitions failed)"));
    }
    sort_upcoming(&mut items);
    Ok(items)
}

pub fn build_upcoming_items(
    code: &str,
    matches: &[ApiMatch],
    ratings: &HashMap<u64, f64>,
) -> Vec<UpcomingItem> {
    matches
        .iter()
        .map(|m| {
            let home_rating = hda::rating_for(ratings, m.home_team.id);
            let away_rating = hda::rating_for(ratings, m.away_team.id);
            let probabilities = hda::compute_hda(home_rating, away_rating);
            let competition = m
                .competition
                .as_ref()
                .map(|c| c.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| code.to_string());
            UpcomingItem {
                id: m.id,
                competition,
                competition_code: code.to_string(),
                kickoff: m.utc_date.clone(),
                matchday: m.matchday,
                home: m.home_team.display_name(),
                away: m.away_team.display_name(),
                home_crest: m.home_team.crest.clone(),
                away_crest: m.away_team.crest.clone(),
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

pub fn sort_upcoming(items: &mut [UpcomingItem]) {
    items.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then(a.id.cmp(&b.id)));
}

/// Published form of a rating: three decimals, absent when unrated.
pub fn published_rating(v: f64) -> Option<f64> {
    v.is_finite().then(|| (v * 1000.0).round() / 1000.0)
}

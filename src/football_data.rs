use std::thread;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;

use crate::config::Config;
use crate::http_cache::fetch_text_cached;
use crate::http_client::http_client;

const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiTeam {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub tla: Option<String>,
    #[serde(default)]
    pub crest: Option<String>,
}

impl ApiTeam {
    /// Short name when the provider has one, full name otherwise.
    pub fn display_name(&self) -> String {
        self.short_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.name.trim())
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiCompetition {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub emblem: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub struct ScoreLine {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiScore {
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub full_time: ScoreLine,
    #[serde(default, deserialize_with = "null_to_default")]
    pub half_time: ScoreLine,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMatch {
    pub id: u64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub utc_date: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub status: String,
    #[serde(default)]
    pub matchday: Option<u32>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub competition: Option<ApiCompetition>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub home_team: ApiTeam,
    #[serde(default, deserialize_with = "null_to_default")]
    pub away_team: ApiTeam,
    #[serde(default, deserialize_with = "null_to_default")]
    pub score: ApiScore,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    #[serde(default)]
    pub position: u32,
    #[serde(default, deserialize_with = "null_to_default")]
    pub team: ApiTeam,
    #[serde(default)]
    pub played_games: u32,
    #[serde(default)]
    pub won: u32,
    #[serde(default)]
    pub draw: u32,
    #[serde(default)]
    pub lost: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    #[serde(default)]
    pub goal_difference: i32,
    #[serde(default)]
    pub form: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingTable {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub table: Vec<StandingRow>,
}

impl StandingTable {
    /// Tables without a type are treated as TOTAL.
    pub fn is_total(&self) -> bool {
        self.kind
            .as_deref()
            .map(|k| k.eq_ignore_ascii_case("TOTAL"))
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSeason {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub current_matchday: Option<u32>,
}

impl ApiSeason {
    /// "2024/25" style label from the season dates.
    pub fn label(&self) -> Option<String> {
        let start = self.start_date.as_deref()?.get(..4)?;
        match self.end_date.as_deref().and_then(|e| e.get(..4)) {
            Some(end) if end != start => Some(format!("{start}/{}", &end[2..])),
            _ => Some(start.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiStandings {
    #[serde(default, deserialize_with = "null_to_default")]
    pub competition: ApiCompetition,
    #[serde(default)]
    pub season: Option<ApiSeason>,
    #[serde(rename = "standings", default, deserialize_with = "null_to_default")]
    pub tables: Vec<StandingTable>,
}

#[derive(Debug, Deserialize, Default)]
struct MatchesResponse {
    #[serde(default, deserialize_with = "null_to_default")]
    matches: Vec<ApiMatch>,
}

/// Thin client over the football-data.org v4 endpoints the generators use.
pub struct FootballData<'a> {
    cfg: &'a Config,
}

impl<'a> FootballData<'a> {
    pub fn new(cfg: &'a Config) -> Result<Self> {
        if cfg.football_data_api_key.is_none() {
            return Err(anyhow!("FOOTBALL_DATA_API_KEY is not set"));
        }
        Ok(Self { cfg })
    }

    pub fn fetch_competition_matches(
        &self,
        code: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        status: Option<&str>,
    ) -> Result<Vec<ApiMatch>> {
        let mut url = format!(
            "{}/competitions/{code}/matches?dateFrom={}&dateTo={}",
            self.cfg.football_data_base_url,
            date_from.format("%Y-%m-%d"),
            date_to.format("%Y-%m-%d"),
        );
        if let Some(status) = status {
            url.push_str("&status=");
            url.push_str(status);
        }
        let body = self.get(&url).with_context(|| format!("{code} matches request failed"))?;
        parse_matches_json(&body).with_context(|| format!("{code} matches"))
    }

    pub fn fetch_competition_standings(&self, code: &str) -> Result<ApiStandings> {
        let url = format!(
            "{}/competitions/{code}/standings",
            self.cfg.football_data_base_url
        );
        let body = self
            .get(&url)
            .with_context(|| format!("{code} standings request failed"))?;
        parse_standings_json(&body).with_context(|| format!("{code} standings"))
    }

    fn get(&self, url: &str) -> Result<String> {
        if !self.cfg.request_spacing.is_zero() {
            thread::sleep(self.cfg.request_spacing);
        }
        let client = http_client(self.cfg.http_timeout)?;
        let key = self.cfg.football_data_api_key.as_deref().unwrap_or_default();
        debug!("GET {url}");
        fetch_text_cached(client, url, &[(AUTH_HEADER, key)], self.cfg.http_cache)
    }
}

pub fn parse_matches_json(raw: &str) -> Result<Vec<ApiMatch>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let resp: MatchesResponse =
        serde_json::from_str(trimmed).context("invalid matches json")?;
    Ok(resp.matches)
}

pub fn parse_standings_json(raw: &str) -> Result<ApiStandings> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(ApiStandings::default());
    }
    serde_json::from_str(trimmed).context("invalid standings json")
}

fn null_to_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_short_name() {
        let team = ApiTeam {
            id: 1,
            name: "Arsenal FC".to_string(),
            short_name: Some("Arsenal".to_string()),
            tla: Some("ARS".to_string()),
            crest: None,
        };
        assert_eq!(team.display_name(), "Arsenal");
        let bare = ApiTeam {
            short_name: Some("  ".to_string()),
            ..team
        };
        assert_eq!(bare.display_name(), "Arsenal FC");
    }

    #[test]
    fn season_label_spans_years() {
        let season = ApiSeason {
            start_date: Some("2024-08-16".to_string()),
            end_date: Some("2025-05-25".to_string()),
            current_matchday: Some(10),
        };
        assert_eq!(season.label().as_deref(), Some("2024/25"));
        let single = ApiSeason {
            start_date: Some("2026-06-11".to_string()),
            end_date: Some("2026-07-19".to_string()),
            current_matchday: None,
        };
        assert_eq!(single.label().as_deref(), Some("2026"));
    }

    #[test]
    fn null_fields_do_not_break_parsing() {
        let raw = r#"{"matches":[{"id":7,"utcDate":null,"status":"TIMED",
            "homeTeam":{"id":1,"name":null},"awayTeam":{"id":2,"name":"B"},
            "score":{"fullTime":{"home":null,"away":null}}}]}"#;
        let matches = parse_matches_json(raw).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].home_team.name, "");
        assert_eq!(matches[0].score.full_time.home, None);
    }
}

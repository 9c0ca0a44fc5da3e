use anyhow::{Result, anyhow};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::football_data::{ApiStandings, FootballData, StandingRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueTable {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emblem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub rows: Vec<LeagueRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueRow {
    pub position: u32,
    pub team: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tla: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crest: Option<String>,
    pub played: u32,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
}

pub fn generate(cfg: &Config) -> Result<Vec<LeagueTable>> {
    let api = FootballData::new(cfg)?;
    let mut tables = Vec::new();
    let mut failed = 0usize;
    for code in &cfg.competitions {
        match api.fetch_competition_standings(code) {
            Ok(standings) => tables.extend(build_league_tables(code, &standings)),
            Err(err) => {
                warn!("leagues: {code} fetch failed: {err:#}");
                failed += 1;
            }
        }
    }
    if tables.is_empty() {
        return Err(anyhow!("no standings fetched ({failed} competitions failed)"));
    }
    info!("leagues: {} tables", tables.len());
    Ok(tables)
}

pub fn build_league_tables(code: &str, standings: &ApiStandings) -> Vec<LeagueTable> {
    let name = if standings.competition.name.trim().is_empty() {
        code.to_string()
    } else {
        standings.competition.name.trim().to_string()
    };
    let season = standings.season.as_ref().and_then(|s| s.label());

    standings
        .tables
        .iter()
        .filter(|t| t.is_total() && !t.table.is_empty())
        .map(|t| {
            let mut rows: Vec<LeagueRow> = t.table.iter().map(league_row).collect();
            rows.sort_by_key(|r| r.position);
            LeagueTable {
                code: code.to_string(),
                name: name.clone(),
                emblem: standings.competition.emblem.clone(),
                season: season.clone(),
                group: t.group.as_deref().map(pretty_group),
                rows,
            }
        })
        .collect()
}

fn league_row(row: &StandingRow) -> LeagueRow {
    LeagueRow {
        position: row.position,
        team: row.team.display_name(),
        tla: row.team.tla.clone(),
        crest: row.team.crest.clone(),
        played: row.played_games,
        won: row.won,
        draw: row.draw,
        lost: row.lost,
        goals_for: row.goals_for,
        goals_against: row.goals_against,
        goal_difference: row.goal_difference,
        points: row.points,
        form: row
            .form
            .as_deref()
            .map(|f| f.replace(',', ""))
            .filter(|f| !f.is_empty()),
    }
}

/// "GROUP_A" -> "Group A".
fn pretty_group(raw: &str) -> String {
    raw.split('_')
        .filter(|p| !p.is_empty())
        .map(|part| {
            let lower = part.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

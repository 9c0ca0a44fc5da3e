use std::collections::HashMap;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::Config;
use crate::hda::{Hda, Outcome};
use crate::llm;
use crate::upcoming::{self, UpcomingItem};

const SYSTEM_PROMPT: &str = "You are a football analyst writing short pre-match signals for a \
fan site. Reply with JSON only: {\"signals\":[{\"fixtureId\":number,\
\"pick\":\"home\"|\"draw\"|\"away\",\"confidence\":0-100,\"headline\":string,\
\"rationale\":string}]}. One signal per fixture at most. \
Headlines under 70 characters, rationale one or two sentences.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalOrigin {
    Llm,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalItem {
    pub fixture_id: u64,
    pub competition: String,
    pub kickoff: String,
    pub home: String,
    pub away: String,
    pub pick: Outcome,
    pub confidence: u8,
    pub headline: String,
    pub rationale: String,
    pub origin: SignalOrigin,
}

pub fn generate(cfg: &Config, today: NaiveDate) -> Result<Vec<SignalItem>> {
    let mut fixtures = upcoming::collect_upcoming(cfg, today)?;
    fixtures.truncate(cfg.signals_fixtures);
    if fixtures.is_empty() {
        return Err(anyhow!("no upcoming fixtures to write signals for"));
    }

    if cfg.llm_api_key.is_some() {
        match llm::complete_json(cfg, SYSTEM_PROMPT, &build_prompt(&fixtures)) {
            Ok(reply) => {
                let signals = signals_from_llm(&reply, &fixtures);
                if !signals.is_empty() {
                    info!("signals: {} from llm", signals.len());
                    return Ok(signals);
                }
                warn!("signals: llm reply had no usable entries, using model");
            }
            Err(err) => warn!("signals: llm failed, using model: {err:#}"),
        }
    }

    let signals: Vec<SignalItem> = fixtures.iter().map(model_signal).collect();
    info!("signals: {} from model", signals.len());
    Ok(signals)
}

pub fn build_prompt(fixtures: &[UpcomingItem]) -> String {
    let rows: Vec<Value> = fixtures
        .iter()
        .map(|f| {
            json!({
                "fixtureId": f.id,
                "competition": f.competition,
                "kickoff": f.kickoff,
                "home": f.home,
                "away": f.away,
                "modelProbabilities": f.probabilities,
            })
        })
        .collect();
    format!(
        "Upcoming fixtures with model probabilities (home/draw/away):\n{}\n\
         Write a signal for each fixture where you have a view.",
        serde_json::to_string_pretty(&rows).unwrap_or_default()
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignal {
    #[serde(default)]
    fixture_id: Value,
    #[serde(default)]
    pick: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    rationale: Option<String>,
}

/// Keeps only entries that name a known fixture, a valid pick and a headline.
pub fn signals_from_llm(reply: &Value, fixtures: &[UpcomingItem]) -> Vec<SignalItem> {
    let by_id: HashMap<u64, &UpcomingItem> = fixtures.iter().map(|f| (f.id, f)).collect();
    let entries = reply
        .get("signals")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut out: Vec<SignalItem> = Vec::new();
    for entry in entries {
        let Ok(raw) = serde_json::from_value::<RawSignal>(entry) else {
            continue;
        };
        let Some(id) = value_to_id(&raw.fixture_id) else {
            continue;
        };
        let Some(fixture) = by_id.get(&id) else {
            continue;
        };
        if out.iter().any(|s| s.fixture_id == id) {
            continue;
        }
        let Some(pick) = raw.pick.as_deref().and_then(parse_pick) else {
            continue;
        };
        let headline = raw.headline.unwrap_or_default().trim().to_string();
        if headline.is_empty() {
            continue;
        }
        let confidence = raw
            .confidence
            .filter(|c| c.is_finite())
            .map(|c| c.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(50);
        out.push(SignalItem {
            fixture_id: id,
            competition: fixture.competition.clone(),
            kickoff: fixture.kickoff.clone(),
            home: fixture.home.clone(),
            away: fixture.away.clone(),
            pick,
            confidence,
            headline,
            rationale: raw.rationale.unwrap_or_default().trim().to_string(),
            origin: SignalOrigin::Llm,
        });
    }
    out
}

pub fn model_signal(fixture: &UpcomingItem) -> SignalItem {
    let p = fixture.probabilities;
    let pick = p.favourite();
    let headline = match pick {
        Outcome::Home => format!("{} favoured", fixture.home),
        Outcome::Away => format!("{} favoured", fixture.away),
        Outcome::Draw => "Tight one: draw in play".to_string(),
    };
    SignalItem {
        fixture_id: fixture.id,
        competition: fixture.competition.clone(),
        kickoff: fixture.kickoff.clone(),
        home: fixture.home.clone(),
        away: fixture.away.clone(),
        pick,
        confidence: model_confidence(&p),
        headline,
        rationale: format!(
            "Model gives {} {}%, draw {}%, {} {}%.",
            fixture.home,
            pct(p.home),
            pct(p.draw),
            fixture.away,
            pct(p.away)
        ),
        origin: SignalOrigin::Model,
    }
}

/// 50 for a coin flip, rising with the margin over the runner-up, capped at 95.
pub fn model_confidence(p: &Hda) -> u8 {
    let mut sorted = [p.home, p.draw, p.away];
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let margin = sorted[0] - sorted[1];
    (100.0 * margin * 2.0 + 50.0).round().clamp(50.0, 95.0) as u8
}

fn pct(v: f64) -> String {
    format!("{:.0}", v * 100.0)
}

fn parse_pick(raw: &str) -> Option<Outcome> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "home" | "1" => Some(Outcome::Home),
        "draw" | "x" => Some(Outcome::Draw),
        "away" | "2" => Some(Outcome::Away),
        _ => None,
    }
}

fn value_to_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

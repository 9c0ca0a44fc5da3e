use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::football_data::{ApiStandings, StandingRow};

const GD_WEIGHT: f64 = 0.35;
const GF_WEIGHT: f64 = 0.10;
const HOME_ADV: f64 = 0.18;
const K_STEEPNESS: f64 = 1.65;
const CLOSENESS_DECAY: f64 = 1.25;
const DRAW_BASE: f64 = 0.22;
const DRAW_CLOSENESS: f64 = 0.12;
const DRAW_MIN: f64 = 0.18;
const DRAW_MAX: f64 = 0.36;

/// Home/draw/away probabilities for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hda {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Hda {
    /// Returned when either rating is missing. Sums to 1.00 as written.
    pub const NEUTRAL: Hda = Hda {
        home: 0.34,
        draw: 0.32,
        away: 0.34,
    };

    /// Most likely outcome; ties go home, then draw.
    pub fn favourite(&self) -> Outcome {
        if self.home >= self.draw && self.home >= self.away {
            Outcome::Home
        } else if self.draw >= self.away {
            Outcome::Draw
        } else {
            Outcome::Away
        }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Strength scalar from a standings line. NaN when no games have been played.
pub fn team_rating(points: u32, played: u32, goal_difference: i32, goals_for: u32) -> f64 {
    if played == 0 {
        return f64::NAN;
    }
    let gp = played as f64;
    points as f64 / gp
        + GD_WEIGHT * (goal_difference as f64 / gp)
        + GF_WEIGHT * (goals_for as f64 / gp)
}

pub fn row_rating(row: &StandingRow) -> f64 {
    team_rating(
        row.points,
        row.played_games,
        row.goal_difference,
        row.goals_for,
    )
}

/// Ratings keyed by team id, taken from every TOTAL table of the competition.
pub fn ratings_from_standings(standings: &ApiStandings) -> HashMap<u64, f64> {
    let mut out = HashMap::new();
    for table in standings.tables.iter().filter(|t| t.is_total()) {
        for row in &table.table {
            let rating = row_rating(row);
            if rating.is_finite() {
                out.insert(row.team.id, rating);
            }
        }
    }
    out
}

/// Lookup helper: absent teams rate as NaN so the estimator falls back.
pub fn rating_for(ratings: &HashMap<u64, f64>, team_id: u64) -> f64 {
    ratings.get(&team_id).copied().unwrap_or(f64::NAN)
}

pub fn compute_hda(home_rating: f64, away_rating: f64) -> Hda {
    if !home_rating.is_finite() || !away_rating.is_finite() {
        return Hda::NEUTRAL;
    }

    let diff = home_rating - away_rating;
    let x = diff + HOME_ADV;
    let win_no_draw = sigmoid(K_STEEPNESS * x);

    let closeness = (-CLOSENESS_DECAY * diff.abs()).exp();
    let draw = (DRAW_BASE + DRAW_CLOSENESS * closeness).clamp(DRAW_MIN, DRAW_MAX);

    let home = (1.0 - draw) * win_no_draw;
    let away = (1.0 - draw) * (1.0 - win_no_draw);

    let sum = home + draw + away;
    Hda {
        home: round4(home / sum),
        draw: round4(draw / sum),
        away: round4(away / sum),
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

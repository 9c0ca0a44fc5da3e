use anyhow::{Context, Result, anyhow};

use netthud::hda;

// Quick manual check of the estimator: `hda <home_rating> <away_rating>`.
// Anything that does not parse as a number is treated as a missing rating.
fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.len() != 2 {
        return Err(anyhow!("usage: hda <home_rating> <away_rating>"));
    }
    let home = parse_rating(&args[0]);
    let away = parse_rating(&args[1]);

    let p = hda::compute_hda(home, away);
    println!("Home: {:.1}%", p.home * 100.0);
    println!("Draw: {:.1}%", p.draw * 100.0);
    println!("Away: {:.1}%", p.away * 100.0);
    println!("Favourite: {:?}", p.favourite());
    println!(
        "{}",
        serde_json::to_string(&p).context("serialize probabilities")?
    );
    Ok(())
}

fn parse_rating(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

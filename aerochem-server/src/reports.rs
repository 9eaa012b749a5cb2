use aerochem_game::numbers::round_f64_to_i64;
use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use crate::autopilot::{GameEnding, GameRecord};

/// A batch of autopilot games with summary figures.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub games: usize,
    pub wins: usize,
    pub average_distance_km: f64,
    pub records: Vec<GameRecord>,
}

impl RunReport {
    pub fn new(records: Vec<GameRecord>) -> Self {
        let wins = records
            .iter()
            .filter(|record| record.ending == GameEnding::Won)
            .count();
        let total_distance: f64 = records.iter().map(|r| r.distance_flown_km).sum();
        #[allow(clippy::cast_precision_loss)]
        let average_distance_km = if records.is_empty() {
            0.0
        } else {
            total_distance / records.len() as f64
        };
        Self {
            generated_at: Utc::now(),
            games: records.len(),
            wins,
            average_distance_km,
            records,
        }
    }

    fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.wins as f64 / self.games as f64 * 100.0;
        rate
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &RunReport,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Autopilot Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;
    writeln!(out, "Games: {}", report.games)?;
    writeln!(out, "Won: {}", report.wins.to_string().green())?;
    writeln!(
        out,
        "Lost: {}",
        (report.games - report.wins).to_string().red()
    )?;
    writeln!(out, "Win rate: {:.1}%", report.win_rate())?;
    writeln!(
        out,
        "Average distance: {} km",
        round_f64_to_i64(report.average_distance_km)
    )?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for record in &report.records {
        let status = match record.ending {
            GameEnding::Won => "✅ WON".green(),
            GameEnding::Stranded => "⛽ STRANDED".red(),
            GameEnding::Retired => "🛬 RETIRED".yellow(),
            GameEnding::TurnLimit => "⏱ TURN LIMIT".yellow(),
        };
        writeln!(
            out,
            "{status} seed {} ({})",
            record.seed.to_string().bold(),
            record.strategy
        )?;
        writeln!(
            out,
            "   Chemicals: {}/5 [{}]",
            record.chemicals,
            record.collected.join(", ")
        )?;
        writeln!(
            out,
            "   Travels: {} over {} km, {} airports",
            record.travels,
            round_f64_to_i64(record.distance_flown_km),
            record.airports_visited
        )?;
        writeln!(
            out,
            "   Budget: {} (fuel {}, events {:+})",
            record.budget, record.fuel_spent, record.event_income
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &RunReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &RunReport) -> Result<()> {
    writeln!(out, "# AeroChem Autopilot Results\n")?;
    writeln!(
        out,
        "_Generated {}_\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Games**: {}", report.games)?;
    writeln!(out, "- **Won**: {}", report.wins)?;
    writeln!(out, "- **Win rate**: {:.1}%\n", report.win_rate())?;

    writeln!(out, "## Games\n")?;
    writeln!(
        out,
        "| Seed | Strategy | Ending | Chemicals | Distance (km) | Budget |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for record in &report.records {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            record.seed,
            record.strategy,
            record.ending.label(),
            record.chemicals,
            round_f64_to_i64(record.distance_flown_km),
            record.budget
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autopilot::Strategy;

    fn record(seed: u64, ending: GameEnding) -> GameRecord {
        GameRecord {
            seed,
            strategy: Strategy::Greedy,
            ending,
            turns: 9,
            chemicals: if ending == GameEnding::Won { 5 } else { 2 },
            collected: vec!["Octane".into(), "Toluene".into()],
            budget: 1_200,
            range_km: 80.0,
            distance_flown_km: 2_345.6,
            travels: 9,
            airports_visited: 10,
            fuel_spent: 3_000,
            event_income: -200,
        }
    }

    fn sample() -> RunReport {
        RunReport::new(vec![
            record(1, GameEnding::Won),
            record(2, GameEnding::Stranded),
        ])
    }

    #[test]
    fn summary_counts_wins() {
        let report = sample();
        assert_eq!(report.games, 2);
        assert_eq!(report.wins, 1);
        assert!((report.win_rate() - 50.0).abs() < 1e-9);
        assert!((report.average_distance_km - 2_345.6).abs() < 1e-9);
        assert!(RunReport::new(Vec::new()).win_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn markdown_lists_every_game() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("# AeroChem Autopilot Results"));
        assert!(text.contains("| 1 | Greedy | won | 5 | 2346 | 1200 |"));
        assert!(text.contains("| 2 | Greedy | stranded |"));
    }

    #[test]
    fn json_report_round_trips_records() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["records"][1]["ending"], "stranded");
        assert_eq!(value["wins"], 1);
    }

    #[test]
    fn console_report_mentions_each_seed() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        generate_console_report(&mut out, &sample(), Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("WON seed 1"));
        assert!(text.contains("STRANDED seed 2"));
    }
}

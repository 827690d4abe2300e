//! Weekly review command

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tend_core::models::TweakDecision;
use tend_core::weekly::{current_week_start, WeeklyAdjuster};

use super::open_db;

pub fn cmd_week(
    db_path: &Path,
    no_encrypt: bool,
    focus: &str,
    week_start: Option<&str>,
    apply: Option<&str>,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    let week_start = match week_start {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .context("Invalid --week-start; expected YYYY-MM-DD")?,
        None => current_week_start(Utc::now()),
    };

    let adjuster = WeeklyAdjuster::new(&db);
    let analysis = adjuster.analyze_week(focus, week_start);

    println!();
    println!("📅 Week of {} — {}", week_start, focus);
    println!("   Completion: {:.0}%", analysis.completion_rate * 100.0);
    println!("   Friction:   {:.0}%", analysis.friction_index * 100.0);
    println!();
    println!("   Win:  {}", analysis.win_text);
    println!("   Hard: {}", analysis.hard_text);
    println!();
    println!(
        "   Suggested: {} — {}",
        analysis.suggested_tweak.display_name(),
        analysis.rationale
    );

    match apply {
        Some(raw) => {
            let decision = TweakDecision::from_str(raw).map_err(|e| {
                anyhow::anyhow!("{} (expected keep, scale_down, or scale_up)", e)
            })?;
            adjuster.apply_tweak(decision, focus, week_start);
            println!();
            println!("✅ Confirmed: {}", decision.display_name());
        }
        None => {
            println!();
            println!(
                "   Confirm with: tend week --focus {} --week-start {} --apply {}",
                focus,
                week_start,
                analysis.suggested_tweak.as_str()
            );
        }
    }

    Ok(())
}

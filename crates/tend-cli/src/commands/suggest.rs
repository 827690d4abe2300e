//! Daily suggestion command

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tend_core::recommend::RecommenderEngine;

use super::open_db;

pub fn cmd_suggest(db_path: &Path, no_encrypt: bool, focus: &str, as_json: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    let engine = RecommenderEngine::new(&db);
    let suggestion = engine.rank(focus, Utc::now());

    if suggestion.is_empty() {
        println!("No actions available for focus '{}'.", focus);
        println!("Load the catalog first: tend seed");
        return Ok(());
    }

    if as_json {
        let actions: Vec<_> = suggestion
            .actions
            .iter()
            .zip(&suggestion.chosen_variants)
            .map(|(action, duration)| {
                let steps = action
                    .variants
                    .iter()
                    .find(|v| v.duration_minutes == *duration)
                    .map(|v| v.steps.clone())
                    .unwrap_or_default();
                json!({
                    "id": action.id,
                    "title": action.title,
                    "whyLine": action.why_line,
                    "durationMinutes": duration,
                    "steps": steps,
                })
            })
            .collect();
        let doc = json!({
            "focus": focus,
            "headline": suggestion.headline,
            "explainWhy": suggestion.why_summary,
            "actions": actions,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!();
    println!("🌱 {}", suggestion.headline);
    println!();
    for (action, duration) in suggestion.actions.iter().zip(&suggestion.chosen_variants) {
        println!("   {} ({} min)  [{}]", action.title, duration, action.id);
        println!("      {}", action.why_line);
        if let Some(variant) = action
            .variants
            .iter()
            .find(|v| v.duration_minutes == *duration)
        {
            for step in &variant.steps {
                println!("      • {}", step);
            }
        }
        println!();
    }
    println!("   {}", suggestion.why_summary);
    println!();
    println!("   Log an outcome: tend log --focus {} --template <id> --duration <min>", focus);

    Ok(())
}

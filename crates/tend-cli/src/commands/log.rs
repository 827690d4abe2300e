//! Outcome logging command

use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tend_core::models::{ActionInstance, FeltDifficulty, InstanceStatus};
use tracing::warn;

use super::open_db;

#[allow(clippy::too_many_arguments)]
pub fn cmd_log(
    db_path: &Path,
    no_encrypt: bool,
    focus: &str,
    template: &str,
    duration: u32,
    status: &str,
    difficulty: Option<&str>,
    note: Option<String>,
    date: Option<&str>,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    let status = InstanceStatus::from_str(status)
        .map_err(|e| anyhow::anyhow!("{} (expected done, snoozed, or skipped)", e))?;
    let felt_difficulty = difficulty
        .map(|d| {
            FeltDifficulty::from_str(d)
                .map_err(|e| anyhow::anyhow!("{} (expected light, ok, or hard)", e))
        })
        .transpose()?;

    let date = match date {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .context("Invalid --date; expected RFC 3339, e.g. 2026-03-10T17:30:00Z")?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let templates = db.list_action_templates(focus)?;
    let Some(matched) = templates.iter().find(|t| t.id == template) else {
        bail!(
            "Unknown template '{}' for focus '{}'. Run `tend suggest --focus {}` to see ids.",
            template,
            focus,
            focus
        );
    };

    // The instance log only ever holds durations the template actually ships
    let durations = matched.variant_durations();
    if !durations.contains(&duration) {
        bail!(
            "Template '{}' has no {}-minute variant (available: {})",
            template,
            duration,
            durations
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    // Deterministic id: a retried log of the same moment and outcome stays
    // one row, while distinct outcomes in the same second stay distinct
    let instance = ActionInstance {
        id: format!("{}-{}-{}-{}", template, date.timestamp(), duration, status),
        date,
        focus_id: focus.to_string(),
        template_id: template.to_string(),
        variant_duration: duration,
        status,
        felt_difficulty,
        note,
    };

    if db.insert_action_instance(&instance)? {
        println!("✅ Logged {} ({} min, {})", template, duration, status);
    } else {
        warn!(instance_id = %instance.id, "Instance already logged");
        println!("   Already logged; nothing to do");
    }
    Ok(())
}

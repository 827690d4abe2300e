//! Weekly summary queries

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::params;
use tracing::debug;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{TweakDecision, WeeklySummary};

impl Database {
    /// Persist a confirmed weekly decision.
    ///
    /// Keyed on (focus_id, week_start): re-confirming the same week replaces
    /// the earlier record instead of adding a second one.
    pub fn upsert_weekly_summary(&self, summary: &WeeklySummary) -> Result<()> {
        let conn = self.conn()?;

        let week_start = summary.week_start.format("%Y-%m-%d").to_string();

        let updated = conn.execute(
            "UPDATE weekly_summaries
             SET id = ?1, win_text = ?4, hard_text = ?5, suggested_tweak = ?6
             WHERE focus_id = ?2 AND week_start = ?3",
            params![
                summary.id,
                summary.focus_id,
                week_start,
                summary.win_text,
                summary.hard_text,
                summary.suggested_tweak.as_str(),
            ],
        )?;

        if updated > 0 {
            debug!(
                focus_id = %summary.focus_id,
                week_start = %week_start,
                "Superseded weekly summary"
            );
            return Ok(());
        }

        conn.execute(
            "INSERT INTO weekly_summaries
             (id, week_start, focus_id, win_text, hard_text, suggested_tweak)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                summary.id,
                week_start,
                summary.focus_id,
                summary.win_text,
                summary.hard_text,
                summary.suggested_tweak.as_str(),
            ],
        )?;

        Ok(())
    }

    /// List weekly summaries for a focus, most recent week first.
    pub fn list_weekly_summaries(
        &self,
        focus_id: &str,
        limit: usize,
    ) -> Result<Vec<WeeklySummary>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, week_start, focus_id, win_text, hard_text, suggested_tweak
             FROM weekly_summaries
             WHERE focus_id = ?1
             ORDER BY week_start DESC
             LIMIT ?2",
        )?;

        let rows: Vec<_> = stmt
            .query_map(params![focus_id, limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut summaries = Vec::with_capacity(rows.len());
        for (id, week_start, focus_id, win_text, hard_text, tweak) in rows {
            let week_start = NaiveDate::parse_from_str(&week_start, "%Y-%m-%d")
                .map_err(|e| Error::InvalidData(format!("Bad week_start: {}", e)))?;
            let suggested_tweak =
                TweakDecision::from_str(&tweak).map_err(Error::InvalidData)?;
            summaries.push(WeeklySummary {
                id,
                week_start,
                focus_id,
                win_text,
                hard_text,
                suggested_tweak,
            });
        }

        Ok(summaries)
    }
}

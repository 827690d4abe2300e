//! Logged outcome queries
//!
//! The instance log is append-only. Saves are idempotent on id so a retried
//! `tend log` never produces a duplicate row.

use std::str::FromStr;

use rusqlite::params;
use tracing::debug;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ActionInstance, FeltDifficulty, InstanceStatus};
use crate::repository::DateRange;

type InstanceRow = (
    String,
    String,
    String,
    String,
    u32,
    String,
    Option<String>,
    Option<String>,
);

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<InstanceRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

impl Database {
    /// Insert a logged outcome. Returns false if the id already exists.
    pub fn insert_action_instance(&self, instance: &ActionInstance) -> Result<bool> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO action_instances
             (id, date, focus_id, template_id, variant_duration, status,
              felt_difficulty, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                instance.id,
                format_datetime(instance.date),
                instance.focus_id,
                instance.template_id,
                instance.variant_duration,
                instance.status.as_str(),
                instance.felt_difficulty.map(|d| d.as_str()),
                instance.note,
            ],
        )?;

        if inserted == 0 {
            debug!(instance_id = %instance.id, "Instance already logged, skipping");
        }
        Ok(inserted > 0)
    }

    /// List instances within a half-open date range, newest first.
    pub fn list_action_instances(
        &self,
        range: DateRange,
        focus_id: Option<&str>,
    ) -> Result<Vec<ActionInstance>> {
        let conn = self.conn()?;

        let start = format_datetime(range.start);
        let end = format_datetime(range.end);

        let mut query = String::from(
            "SELECT id, date, focus_id, template_id, variant_duration, status,
                    felt_difficulty, note
             FROM action_instances
             WHERE date >= ?1 AND date < ?2",
        );
        if focus_id.is_some() {
            query.push_str(" AND focus_id = ?3");
        }
        query.push_str(" ORDER BY date DESC");

        let mut stmt = conn.prepare(&query)?;

        let rows: Vec<_> = match focus_id {
            Some(f) => stmt
                .query_map(params![start, end, f], map_row)?
                .collect::<std::result::Result<_, _>>()?,
            None => stmt
                .query_map(params![start, end], map_row)?
                .collect::<std::result::Result<_, _>>()?,
        };

        let mut instances = Vec::with_capacity(rows.len());
        for (id, date, focus_id, template_id, duration, status, difficulty, note) in rows {
            let status = InstanceStatus::from_str(&status).map_err(Error::InvalidData)?;
            let felt_difficulty = difficulty
                .map(|d| FeltDifficulty::from_str(&d).map_err(Error::InvalidData))
                .transpose()?;
            instances.push(ActionInstance {
                id,
                date: parse_datetime(&date)?,
                focus_id,
                template_id,
                variant_duration: duration,
                status,
                felt_difficulty,
                note,
            });
        }

        Ok(instances)
    }

    /// Count logged instances, optionally scoped to a focus.
    pub fn count_action_instances(&self, focus_id: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;
        let count = match focus_id {
            Some(f) => conn.query_row(
                "SELECT COUNT(*) FROM action_instances WHERE focus_id = ?1",
                params![f],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM action_instances", [], |row| {
                row.get(0)
            })?,
        };
        Ok(count)
    }
}

//! Focus area queries

use rusqlite::params;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{BuildingBlock, FocusArea};

fn row_to_focus(
    id: String,
    name: String,
    active: bool,
    started_at: String,
    blocks: String,
    pinned: String,
) -> Result<FocusArea> {
    let building_blocks: Vec<BuildingBlock> = serde_json::from_str(&blocks)?;
    let pinned_micro_skill_titles: Vec<String> = serde_json::from_str(&pinned)?;
    Ok(FocusArea {
        id,
        name,
        active,
        started_at: parse_datetime(&started_at)?,
        building_blocks,
        pinned_micro_skill_titles,
    })
}

impl Database {
    /// Insert or update a focus area by id.
    pub fn upsert_focus_area(&self, focus: &FocusArea) -> Result<()> {
        let conn = self.conn()?;

        let blocks = serde_json::to_string(&focus.building_blocks)?;
        let pinned = serde_json::to_string(&focus.pinned_micro_skill_titles)?;
        let started_at = format_datetime(focus.started_at);

        let updated = conn.execute(
            "UPDATE focus_areas
             SET name = ?2, active = ?3, started_at = ?4, building_blocks = ?5,
                 pinned_micro_skill_titles = ?6
             WHERE id = ?1",
            params![focus.id, focus.name, focus.active, started_at, blocks, pinned],
        )?;

        if updated == 0 {
            conn.execute(
                "INSERT INTO focus_areas
                 (id, name, active, started_at, building_blocks, pinned_micro_skill_titles)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![focus.id, focus.name, focus.active, started_at, blocks, pinned],
            )?;
        }

        Ok(())
    }

    /// Look up a focus area by id.
    pub fn get_focus_area(&self, focus_id: &str) -> Result<Option<FocusArea>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, active, started_at, building_blocks, pinned_micro_skill_titles
             FROM focus_areas WHERE id = ?1",
        )?;

        let row = stmt
            .query_row(params![focus_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(Error::Database(other)),
            })?;

        match row {
            Some((id, name, active, started_at, blocks, pinned)) => {
                Ok(Some(row_to_focus(id, name, active, started_at, blocks, pinned)?))
            }
            None => Ok(None),
        }
    }

    /// List all focus areas, active first.
    pub fn list_focus_areas(&self) -> Result<Vec<FocusArea>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, active, started_at, building_blocks, pinned_micro_skill_titles
             FROM focus_areas
             ORDER BY active DESC, id",
        )?;

        let rows: Vec<_> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut areas = Vec::with_capacity(rows.len());
        for (id, name, active, started_at, blocks, pinned) in rows {
            areas.push(row_to_focus(id, name, active, started_at, blocks, pinned)?);
        }
        Ok(areas)
    }
}

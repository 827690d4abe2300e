//! Action catalog queries

use rusqlite::params;
use tracing::debug;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{ActionTemplate, TemplateVariant};

impl Database {
    /// Insert or update a catalog template, gated on `content_version`.
    ///
    /// An existing row is only overwritten when the incoming version is
    /// strictly newer, so a re-import of the same catalog is a no-op.
    /// Returns true if the row was written.
    pub fn upsert_action_template(&self, template: &ActionTemplate) -> Result<bool> {
        let conn = self.conn()?;

        let tags = serde_json::to_string(&template.tags)?;
        let variants = serde_json::to_string(&template.variants)?;
        let contraindications = serde_json::to_string(&template.contraindications)?;

        let updated = conn.execute(
            "UPDATE action_templates
             SET focus_id = ?2, title = ?3, why_line = ?4, tags = ?5,
                 difficulty = ?6, variants = ?7, contraindications = ?8,
                 content_version = ?9
             WHERE id = ?1 AND content_version < ?9",
            params![
                template.id,
                template.focus_id,
                template.title,
                template.why_line,
                tags,
                template.difficulty,
                variants,
                contraindications,
                template.content_version,
            ],
        )?;

        if updated > 0 {
            debug!(template_id = %template.id, "Updated action template");
            return Ok(true);
        }

        // No row updated: either absent, or present at >= version
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO action_templates
             (id, focus_id, title, why_line, tags, difficulty, variants,
              contraindications, content_version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                template.id,
                template.focus_id,
                template.title,
                template.why_line,
                tags,
                template.difficulty,
                variants,
                contraindications,
                template.content_version,
            ],
        )?;

        Ok(inserted > 0)
    }

    /// List catalog templates for a focus, in catalog (insertion) order.
    pub fn list_action_templates(&self, focus_id: &str) -> Result<Vec<ActionTemplate>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, focus_id, title, why_line, tags, difficulty, variants,
                    contraindications, content_version
             FROM action_templates
             WHERE focus_id = ?1
             ORDER BY rowid",
        )?;

        let rows = stmt.query_map(params![focus_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, u8>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, i64>(8)?,
            ))
        })?;

        let mut templates = Vec::new();
        for row in rows {
            let (id, focus_id, title, why_line, tags, difficulty, variants, contra, version) =
                row?;
            let tags: Vec<String> = serde_json::from_str(&tags)?;
            let variants: Vec<TemplateVariant> = serde_json::from_str(&variants)?;
            let contraindications: Vec<String> = serde_json::from_str(&contra)?;
            templates.push(ActionTemplate {
                id,
                focus_id,
                title,
                why_line,
                tags,
                difficulty,
                variants,
                contraindications,
                content_version: version,
            });
        }

        Ok(templates)
    }

    /// Look up a single template by id.
    pub fn get_action_template(&self, id: &str) -> Result<Option<ActionTemplate>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT focus_id FROM action_templates WHERE id = ?1",
        )?;
        let focus_id: Option<String> = stmt
            .query_row(params![id], |row| row.get(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(Error::Database(other)),
            })?;

        let Some(focus_id) = focus_id else {
            return Ok(None);
        };
        Ok(self
            .list_action_templates(&focus_id)?
            .into_iter()
            .find(|t| t.id == id))
    }

    /// Count catalog templates, optionally scoped to a focus.
    pub fn count_action_templates(&self, focus_id: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;
        let count = match focus_id {
            Some(f) => conn.query_row(
                "SELECT COUNT(*) FROM action_templates WHERE focus_id = ?1",
                params![f],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM action_templates", [], |row| {
                row.get(0)
            })?,
        };
        Ok(count)
    }
}

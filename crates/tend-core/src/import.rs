//! Catalog import
//!
//! Reads an action catalog from JSON and loads it into the database.
//! Imports are safe to repeat: templates are version-gated, so an unchanged
//! catalog is a no-op and a bumped `contentVersion` supersedes in place.

use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{ActionTemplate, FocusArea, TemplateVariant};

/// Catalog file shipped with the binary, used by `tend seed`.
pub const DEFAULT_CATALOG: &str = include_str!("../assets/default_catalog.json");

/// Top-level catalog document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    content_version: i64,
    actions: Vec<CatalogAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogAction {
    id: String,
    focus_id: String,
    title: String,
    why_line: String,
    #[serde(default)]
    tags: Vec<String>,
    difficulty: u8,
    variants: Vec<CatalogVariant>,
    #[serde(default)]
    contraindications: Vec<String>,
    /// Per-action override; falls back to the file-level version.
    content_version: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogVariant {
    duration_minutes: u32,
    #[serde(default)]
    steps: Vec<String>,
}

/// Outcome of one catalog import.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportStats {
    /// Templates written (new or superseded by a newer version)
    pub imported: usize,
    /// Templates skipped because the stored version was current
    pub skipped: usize,
}

/// Import a catalog from a JSON file on disk.
pub fn import_catalog_file(db: &Database, path: &Path) -> Result<ImportStats> {
    let raw = std::fs::read_to_string(path)?;
    import_catalog(db, &raw)
}

/// Import a catalog from a JSON string.
pub fn import_catalog(db: &Database, raw: &str) -> Result<ImportStats> {
    let catalog: CatalogFile = serde_json::from_str(raw)?;

    ensure_default_focus_areas(db)?;

    let mut stats = ImportStats::default();
    for action in &catalog.actions {
        validate_action(action)?;

        let template = ActionTemplate {
            id: action.id.clone(),
            focus_id: action.focus_id.clone(),
            title: action.title.clone(),
            why_line: action.why_line.clone(),
            tags: action.tags.clone(),
            difficulty: action.difficulty,
            variants: action
                .variants
                .iter()
                .map(|v| TemplateVariant {
                    duration_minutes: v.duration_minutes,
                    steps: v.steps.clone(),
                })
                .collect(),
            contraindications: action.contraindications.clone(),
            content_version: action.content_version.unwrap_or(catalog.content_version),
        };

        if db.upsert_action_template(&template)? {
            stats.imported += 1;
        } else {
            stats.skipped += 1;
        }
    }

    info!(
        imported = stats.imported,
        skipped = stats.skipped,
        "Catalog import complete"
    );
    Ok(stats)
}

fn validate_action(action: &CatalogAction) -> Result<()> {
    if action.id.is_empty() {
        return Err(Error::Import("Action with empty id".to_string()));
    }
    if action.variants.is_empty() {
        return Err(Error::Import(format!(
            "Action '{}' has no duration variants",
            action.id
        )));
    }
    if !(1..=5).contains(&action.difficulty) {
        return Err(Error::Import(format!(
            "Action '{}' difficulty {} outside 1..=5",
            action.id, action.difficulty
        )));
    }
    Ok(())
}

/// Create the two built-in focus areas if they don't exist yet.
///
/// Existing rows are left alone so caregiver edits (pins, deactivation)
/// survive re-imports.
pub fn ensure_default_focus_areas(db: &Database) -> Result<()> {
    for (id, name) in [
        ("independence", "Independence"),
        ("emotion_skills", "Emotion Skills"),
    ] {
        if db.get_focus_area(id)?.is_none() {
            db.upsert_focus_area(&FocusArea {
                id: id.to_string(),
                name: name.to_string(),
                active: true,
                started_at: Utc::now(),
                building_blocks: Vec::new(),
                pinned_micro_skill_titles: Vec::new(),
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::in_memory().unwrap()
    }

    #[test]
    fn test_default_catalog_imports_cleanly() {
        let db = db();
        let stats = import_catalog(&db, DEFAULT_CATALOG).unwrap();
        assert!(stats.imported >= 6);
        assert_eq!(stats.skipped, 0);

        // Both built-in focus areas exist and have actions
        for focus in ["independence", "emotion_skills"] {
            assert!(db.get_focus_area(focus).unwrap().is_some());
            assert!(!db.list_action_templates(focus).unwrap().is_empty());
        }
    }

    #[test]
    fn test_reimport_is_a_no_op() {
        let db = db();
        let first = import_catalog(&db, DEFAULT_CATALOG).unwrap();
        let second = import_catalog(&db, DEFAULT_CATALOG).unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, first.imported);
    }

    #[test]
    fn test_per_action_version_overrides_file_version() {
        let db = db();
        let raw = r#"{
            "contentVersion": 1,
            "actions": [{
                "id": "t1",
                "focusId": "independence",
                "title": "Choice board",
                "whyLine": "Choices build agency",
                "tags": ["initiative"],
                "difficulty": 2,
                "variants": [{"durationMinutes": 5, "steps": ["Offer two options"]}],
                "contentVersion": 7
            }]
        }"#;
        import_catalog(&db, raw).unwrap();
        let stored = db.get_action_template("t1").unwrap().unwrap();
        assert_eq!(stored.content_version, 7);
    }

    #[test]
    fn test_rejects_action_without_variants() {
        let db = db();
        let raw = r#"{
            "contentVersion": 1,
            "actions": [{
                "id": "t1",
                "focusId": "independence",
                "title": "Choice board",
                "whyLine": "Choices build agency",
                "difficulty": 2,
                "variants": []
            }]
        }"#;
        let err = import_catalog(&db, raw).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_rejects_difficulty_out_of_range() {
        let db = db();
        let raw = r#"{
            "contentVersion": 1,
            "actions": [{
                "id": "t1",
                "focusId": "independence",
                "title": "Choice board",
                "whyLine": "Choices build agency",
                "difficulty": 6,
                "variants": [{"durationMinutes": 5}]
            }]
        }"#;
        assert!(import_catalog(&db, raw).is_err());
    }

    #[test]
    fn test_reimport_preserves_caregiver_edits_to_focus() {
        let db = db();
        import_catalog(&db, DEFAULT_CATALOG).unwrap();

        let mut area = db.get_focus_area("independence").unwrap().unwrap();
        area.pinned_micro_skill_titles = vec!["Choice board".to_string()];
        db.upsert_focus_area(&area).unwrap();

        import_catalog(&db, DEFAULT_CATALOG).unwrap();
        let stored = db.get_focus_area("independence").unwrap().unwrap();
        assert_eq!(stored.pinned_micro_skill_titles, vec!["Choice board"]);
    }
}

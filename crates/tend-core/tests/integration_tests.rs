//! Integration tests for tend-core
//!
//! These tests exercise the full seed → log → suggest → weekly review
//! workflow against a real SQLite database.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tend_core::{
    db::Database,
    import::{import_catalog, DEFAULT_CATALOG},
    models::{ActionInstance, FeltDifficulty, InstanceStatus, TweakDecision},
    recommend::RecommenderEngine,
    weekly::WeeklyAdjuster,
};

fn seeded_db() -> Database {
    let db = Database::in_memory().expect("Failed to create database");
    import_catalog(&db, DEFAULT_CATALOG).expect("Failed to import default catalog");
    db
}

fn now() -> DateTime<Utc> {
    // Tuesday morning
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
}

fn logged(
    id: &str,
    template_id: &str,
    days_ago: i64,
    duration: u32,
    status: InstanceStatus,
) -> ActionInstance {
    ActionInstance {
        id: id.to_string(),
        date: now() - Duration::days(days_ago),
        focus_id: "independence".to_string(),
        template_id: template_id.to_string(),
        variant_duration: duration,
        status,
        felt_difficulty: None,
        note: None,
    }
}

// =============================================================================
// Seed → Suggest Workflow
// =============================================================================

#[test]
fn test_fresh_database_still_gets_suggestions() {
    let db = seeded_db();
    let engine = RecommenderEngine::new(&db);

    // No history at all: the recommender must still produce actions
    let suggestion = engine.rank("independence", now());
    assert!(!suggestion.is_empty());
    assert!(suggestion.actions.len() >= 2 && suggestion.actions.len() <= 3);
    assert_eq!(suggestion.actions.len(), suggestion.chosen_variants.len());
    assert!(suggestion.why_summary.contains("Independence"));
}

#[test]
fn test_history_shifts_variant_choice() {
    let db = seeded_db();

    // A week of completed 5-minute actions
    for day in 1..=5 {
        db.insert_action_instance(&logged(
            &format!("i{}", day),
            "ind_try_first",
            day,
            5,
            InstanceStatus::Done,
        ))
        .unwrap();
    }

    let engine = RecommenderEngine::new(&db);
    let suggestion = engine.rank("independence", now());
    assert!(!suggestion.is_empty());
    // Every default independence action offers a 5-minute variant
    assert!(suggestion.chosen_variants.iter().all(|d| *d == 5));
}

#[test]
fn test_recent_stress_note_hides_contraindicated_actions() {
    let db = seeded_db();

    let mut stressed = logged("i1", "ind_try_first", 0, 5, InstanceStatus::Skipped);
    stressed.date = now() - Duration::hours(3);
    stressed.note = Some("Total meltdown before school".to_string());
    db.insert_action_instance(&stressed).unwrap();

    let engine = RecommenderEngine::new(&db);
    let suggestion = engine.rank("independence", now());
    assert!(!suggestion.is_empty());
    // ind_snack_prep carries skip_if_dysregulated in the default catalog
    assert!(suggestion.actions.iter().all(|a| a.id != "ind_snack_prep"));
}

#[test]
fn test_unknown_focus_yields_empty_suggestion() {
    let db = seeded_db();
    let engine = RecommenderEngine::new(&db);
    let suggestion = engine.rank("sleep", now());
    assert!(suggestion.is_empty());
}

// =============================================================================
// Log Workflow
// =============================================================================

#[test]
fn test_retried_log_is_idempotent() {
    let db = seeded_db();
    let inst = logged("i1", "ind_try_first", 1, 10, InstanceStatus::Done);
    assert!(db.insert_action_instance(&inst).unwrap());
    assert!(!db.insert_action_instance(&inst).unwrap());
    assert_eq!(db.count_action_instances(Some("independence")).unwrap(), 1);
}

// =============================================================================
// Weekly Review Workflow
// =============================================================================

#[test]
fn test_strong_week_scales_up_and_persists() {
    let db = seeded_db();
    let week_start = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();

    // 4 of 5 completed, nothing hard: scale up
    for day in 0..5 {
        let status = if day == 0 {
            InstanceStatus::Snoozed
        } else {
            InstanceStatus::Done
        };
        // now() is Tuesday the 10th; days_ago 0..=1 lands inside the week
        db.insert_action_instance(&logged(
            &format!("i{}", day),
            "ind_try_first",
            day % 2,
            10,
            status,
        ))
        .unwrap();
    }

    let adjuster = WeeklyAdjuster::new(&db);
    let analysis = adjuster.analyze_week("independence", week_start);
    assert!(analysis.completion_rate >= 0.7);
    assert_eq!(analysis.suggested_tweak, TweakDecision::ScaleUp);
    assert!(analysis.win_text.contains("Try first, ask for help after"));

    adjuster.apply_tweak(analysis.suggested_tweak, "independence", week_start);
    let stored = db.list_weekly_summaries("independence", 10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].week_start, week_start);
    assert_eq!(stored[0].suggested_tweak, TweakDecision::ScaleUp);
}

#[test]
fn test_hard_week_scales_down() {
    let db = seeded_db();
    let week_start = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();

    for day in 0..2 {
        let mut inst = logged(
            &format!("i{}", day),
            "emo_repair_script",
            day,
            10,
            InstanceStatus::Done,
        );
        inst.focus_id = "emotion_skills".to_string();
        inst.felt_difficulty = Some(FeltDifficulty::Hard);
        db.insert_action_instance(&inst).unwrap();
    }

    let analysis = WeeklyAdjuster::new(&db).analyze_week("emotion_skills", week_start);
    assert!(analysis.friction_index > 0.4);
    assert_eq!(analysis.suggested_tweak, TweakDecision::ScaleDown);
    assert_eq!(
        analysis.hard_text,
        "Several activities felt challenging this week"
    );
}

#[test]
fn test_reconfirming_a_week_supersedes() {
    let db = seeded_db();
    let week_start = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    let adjuster = WeeklyAdjuster::new(&db);

    adjuster.apply_tweak(TweakDecision::Keep, "independence", week_start);
    adjuster.apply_tweak(TweakDecision::ScaleDown, "independence", week_start);

    let stored = db.list_weekly_summaries("independence", 10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].suggested_tweak, TweakDecision::ScaleDown);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tend.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new_unencrypted(path).unwrap();
        import_catalog(&db, DEFAULT_CATALOG).unwrap();
        db.insert_action_instance(&logged("i1", "ind_try_first", 1, 5, InstanceStatus::Done))
            .unwrap();
    }

    let db = Database::new_unencrypted(path).unwrap();
    assert!(db.count_action_templates(None).unwrap() >= 6);
    assert_eq!(db.count_action_instances(None).unwrap(), 1);
    assert!(!RecommenderEngine::new(&db).rank("independence", now()).is_empty());
}

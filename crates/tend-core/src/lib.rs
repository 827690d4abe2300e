//! Tend Core Library
//!
//! Shared functionality for the Tend caregiver micro-practice tool:
//! - Database access and migrations (encrypted SQLite)
//! - Catalog import for action content packs
//! - Behavioral signal derivation from logged history
//! - Daily recommendation scoring and ranking
//! - Rationale copy for suggestions
//! - Weekly keep/scale-down/scale-up adjustment

pub mod db;
pub mod error;
pub mod explain;
pub mod import;
pub mod models;
pub mod recommend;
pub mod repository;
pub mod signals;
pub mod weekly;

/// Test utilities including the in-memory repository
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use db::Database;
pub use error::{Error, Result};
pub use explain::ExplainWhyBuilder;
pub use import::{import_catalog, import_catalog_file, ImportStats};
pub use models::{
    ActionInstance, ActionTemplate, BlockKind, BuildingBlock, FeltDifficulty, FocusArea,
    InstanceStatus, NoveltyTolerance, TemplateVariant, TweakDecision, WeeklySummary,
};
pub use recommend::{RankedSuggestion, RecommenderEngine, ScoringConfig};
pub use repository::{DateRange, HistoryRepository};
pub use signals::SignalsEngine;
pub use weekly::{WeeklyAdjuster, WeeklyAnalysis};

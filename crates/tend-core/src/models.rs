//! Domain models for Tend
//!
//! The catalog side (FocusArea, ActionTemplate, TemplateVariant) is owned by
//! the content import and never mutated by the engines. The history side
//! (ActionInstance, WeeklySummary) is append-only: an instance is written once
//! when the caregiver logs an outcome and never touched again.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one logged action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Done,
    Snoozed,
    Skipped,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Snoozed => "snoozed",
            Self::Skipped => "skipped",
        }
    }
}

impl std::str::FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "done" => Ok(Self::Done),
            "snoozed" => Ok(Self::Snoozed),
            "skipped" => Ok(Self::Skipped),
            _ => Err(format!("Unknown instance status: {}", s)),
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the action felt to the caregiver, when they chose to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeltDifficulty {
    Light,
    Ok,
    Hard,
}

impl FeltDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Ok => "ok",
            Self::Hard => "hard",
        }
    }
}

impl std::str::FromStr for FeltDifficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "ok" => Ok(Self::Ok),
            "hard" => Ok(Self::Hard),
            _ => Err(format!("Unknown felt difficulty: {}", s)),
        }
    }
}

impl std::fmt::Display for FeltDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekly adaptation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweakDecision {
    Keep,
    ScaleDown,
    ScaleUp,
}

impl TweakDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::ScaleDown => "scale_down",
            Self::ScaleUp => "scale_up",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Keep => "Keep",
            Self::ScaleDown => "Scale down",
            Self::ScaleUp => "Scale up",
        }
    }
}

impl std::str::FromStr for TweakDecision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "keep" => Ok(Self::Keep),
            "scale_down" => Ok(Self::ScaleDown),
            "scale_up" => Ok(Self::ScaleUp),
            _ => Err(format!("Unknown tweak decision: {}", s)),
        }
    }
}

impl std::fmt::Display for TweakDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much variety a family tolerates, derived from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoveltyTolerance {
    Low,
    Med,
    High,
}

impl NoveltyTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Med => "med",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for NoveltyTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a focus-area plan entry. Not consumed by the recommender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    MicroSkill,
    Ritual,
    Support,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MicroSkill => "micro_skill",
            Self::Ritual => "ritual",
            Self::Support => "support",
        }
    }
}

impl std::str::FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "micro_skill" => Ok(Self::MicroSkill),
            "ritual" => Ok(Self::Ritual),
            "support" => Ok(Self::Support),
            _ => Err(format!("Unknown building block kind: {}", s)),
        }
    }
}

/// One entry of a focus area's three-part plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingBlock {
    pub kind: BlockKind,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A coaching focus the family is working on, e.g. "independence".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusArea {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub started_at: DateTime<Utc>,
    /// Exactly 3 when configured; empty until then.
    #[serde(default)]
    pub building_blocks: Vec<BuildingBlock>,
    /// Micro-skill titles the caregiver pinned; boosts matching templates.
    #[serde(default)]
    pub pinned_micro_skill_titles: Vec<String>,
}

/// One duration option for an action, with its steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateVariant {
    pub duration_minutes: u32,
    pub steps: Vec<String>,
}

/// Catalog entry describing one micro-practice.
///
/// Templates come from the content import and are updated only when a newer
/// `content_version` is seen. The engines treat them as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTemplate {
    /// Stable id from the catalog, e.g. "ind_choice_board".
    pub id: String,
    pub focus_id: String,
    pub title: String,
    /// One-line rationale shown with the action.
    pub why_line: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 1..=5
    pub difficulty: u8,
    pub variants: Vec<TemplateVariant>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    pub content_version: i64,
}

impl ActionTemplate {
    /// Durations offered by this template, in catalog order.
    pub fn variant_durations(&self) -> Vec<u32> {
        self.variants.iter().map(|v| v.duration_minutes).collect()
    }
}

/// A historical event: the caregiver logged an outcome for one action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionInstance {
    pub id: String,
    pub date: DateTime<Utc>,
    pub focus_id: String,
    /// References ActionTemplate.id; not an ownership link.
    pub template_id: String,
    pub variant_duration: u32,
    pub status: InstanceStatus,
    pub felt_difficulty: Option<FeltDifficulty>,
    pub note: Option<String>,
}

impl ActionInstance {
    pub fn is_done(&self) -> bool {
        self.status == InstanceStatus::Done
    }
}

/// Persisted record of one confirmed weekly decision.
///
/// One logical record per (focus_id, week_start); a repeated decision
/// supersedes rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub id: String,
    pub week_start: NaiveDate,
    pub focus_id: String,
    pub win_text: String,
    pub hard_text: String,
    pub suggested_tweak: TweakDecision,
}

impl WeeklySummary {
    /// Stable id for a (focus, week) pair.
    pub fn make_id(focus_id: &str, week_start: NaiveDate) -> String {
        format!("{}-{}", focus_id, week_start.format("%Y-%m-%d"))
    }
}

//! Weekly analysis and adaptation decision
//!
//! Aggregates one focus area's week of history into a completion rate and a
//! friction index, phrases what went well and what was hard, and decides
//! whether next week should keep, scale down, or scale up. Each week is
//! recomputed independently; the only cross-week state is the persisted
//! summary log.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::{info, warn};

use crate::models::{ActionInstance, InstanceStatus, TweakDecision, WeeklySummary};
use crate::repository::{DateRange, HistoryRepository};
use crate::signals::is_stress_note;

/// Everything derived from one `(focus_id, week_start)` window.
#[derive(Debug, Clone)]
pub struct WeeklyAnalysis {
    pub focus_id: String,
    pub week_start: NaiveDate,
    pub completion_rate: f64,
    pub friction_index: f64,
    pub win_text: String,
    pub hard_text: String,
    pub suggested_tweak: TweakDecision,
    pub rationale: String,
}

/// Decide keep / scale down / scale up from the two weekly metrics.
///
/// High completion with low friction earns a scale-up; low completion or
/// high friction forces a scale-down (friction dominates); everything else
/// keeps the current level.
pub fn decide_tweak(completion_rate: f64, friction_index: f64) -> TweakDecision {
    if completion_rate >= 0.7 && friction_index <= 0.3 {
        TweakDecision::ScaleUp
    } else if completion_rate <= 0.3 || friction_index > 0.4 {
        TweakDecision::ScaleDown
    } else {
        TweakDecision::Keep
    }
}

/// Monday of the week containing `now`, in UTC.
pub fn current_week_start(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

/// Turns a week of history into an analysis and, on confirmation, a
/// persisted `WeeklySummary`.
pub struct WeeklyAdjuster<'a> {
    repo: &'a dyn HistoryRepository,
}

impl<'a> WeeklyAdjuster<'a> {
    pub fn new(repo: &'a dyn HistoryRepository) -> Self {
        Self { repo }
    }

    /// Analyze the seven days starting at `week_start`.
    pub fn analyze_week(&self, focus_id: &str, week_start: NaiveDate) -> WeeklyAnalysis {
        let range = DateRange::week(week_start);
        let instances = match self.repo.fetch_action_instances(range, Some(focus_id)) {
            Ok(instances) => instances,
            Err(e) => {
                warn!(error = %e, focus_id, "Instance fetch failed; analyzing empty week");
                Vec::new()
            }
        };

        let completed: Vec<&ActionInstance> =
            instances.iter().filter(|i| i.is_done()).collect();
        let completion_rate = if instances.is_empty() {
            0.0
        } else {
            completed.len() as f64 / instances.len() as f64
        };
        let friction_index = friction_over(&instances);

        let win_text = self.win_text(focus_id, &completed);
        let hard_text = hard_text(&instances, friction_index);
        let suggested_tweak = decide_tweak(completion_rate, friction_index);
        let rationale = rationale(completion_rate, friction_index, suggested_tweak);

        WeeklyAnalysis {
            focus_id: focus_id.to_string(),
            week_start,
            completion_rate,
            friction_index,
            win_text,
            hard_text,
            suggested_tweak,
            rationale,
        }
    }

    /// Persist the caregiver's confirmed decision for the analyzed week.
    ///
    /// Writes the summary for `week_start` itself. (The original app
    /// recomputed "the current week" here, which would misfile a decision
    /// confirmed while reviewing a past week; the analyzed week is passed
    /// through on purpose.) Fire-and-forget: storage failures are logged
    /// and swallowed.
    pub fn apply_tweak(&self, decision: TweakDecision, focus_id: &str, week_start: NaiveDate) {
        let analysis = self.analyze_week(focus_id, week_start);

        let summary = WeeklySummary {
            id: WeeklySummary::make_id(focus_id, week_start),
            week_start,
            focus_id: focus_id.to_string(),
            win_text: analysis.win_text,
            hard_text: analysis.hard_text,
            suggested_tweak: decision,
        };

        match self.repo.save_weekly_summary(&summary) {
            Ok(()) => info!(
                focus_id,
                week_start = %week_start,
                decision = decision.as_str(),
                "Applied weekly tweak"
            ),
            Err(e) => warn!(error = %e, focus_id, "Failed to persist weekly summary"),
        }
    }

    /// Phrase the week's win from the most-completed template.
    fn win_text(&self, focus_id: &str, completed: &[&ActionInstance]) -> String {
        if completed.is_empty() {
            return "No completed actions this week".to_string();
        }

        let mut counts: HashMap<&str, u32> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for instance in completed {
            let id = instance.template_id.as_str();
            if !counts.contains_key(id) {
                order.push(id);
            }
            *counts.entry(id).or_insert(0) += 1;
        }

        // First template encountered with the max count; deterministic over
        // the repository's instance order.
        let mut best: Option<(&str, u32)> = None;
        for id in order {
            let count = counts[id];
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((id, count)),
            }
        }
        let (template_id, count) = match best {
            Some(pair) => pair,
            None => return format!("Completed {} actions", completed.len()),
        };

        let title = match self.repo.fetch_action_templates(focus_id) {
            Ok(templates) => templates
                .into_iter()
                .find(|t| t.id == template_id)
                .map(|t| t.title),
            Err(e) => {
                warn!(error = %e, focus_id, "Template fetch failed while phrasing win");
                None
            }
        };

        match (title, count) {
            (Some(title), n) if n > 1 => format!("Completed '{}' {} times", title, n),
            (Some(title), _) => format!("Successfully completed '{}'", title),
            (None, _) => format!(
                "Completed {} action{}",
                completed.len(),
                if completed.len() == 1 { "" } else { "s" }
            ),
        }
    }
}

/// Friction over an already-fetched window, same counting rule as the
/// signals engine: an instance counts once if it felt hard or its note
/// reads stressed.
fn friction_over(instances: &[ActionInstance]) -> f64 {
    if instances.is_empty() {
        return 0.0;
    }
    let friction = instances
        .iter()
        .filter(|i| {
            i.felt_difficulty == Some(crate::models::FeltDifficulty::Hard)
                || i.note.as_deref().is_some_and(is_stress_note)
        })
        .count();
    friction as f64 / instances.len() as f64
}

fn hard_text(instances: &[ActionInstance], friction_index: f64) -> String {
    let any_hard = instances
        .iter()
        .any(|i| i.felt_difficulty == Some(crate::models::FeltDifficulty::Hard));
    let any_stress = instances
        .iter()
        .any(|i| i.note.as_deref().is_some_and(is_stress_note));

    if friction_index > 0.4 {
        "Several activities felt challenging this week".to_string()
    } else if any_hard {
        "Some activities felt difficult".to_string()
    } else if any_stress {
        "Noticed some stress during activities".to_string()
    } else {
        "Activities felt manageable overall".to_string()
    }
}

fn rationale(completion_rate: f64, friction_index: f64, tweak: TweakDecision) -> String {
    let percent = (completion_rate * 100.0).round() as u32;
    match tweak {
        TweakDecision::ScaleUp => format!(
            "You're doing great! With {}% completion and low friction, \
             you're ready for slightly more challenging activities.",
            percent
        ),
        TweakDecision::ScaleDown => {
            if completion_rate <= 0.3 {
                format!(
                    "With {}% completion, let's make activities smaller and more manageable.",
                    percent
                )
            } else {
                format!(
                    "The high friction ({}%) suggests we should simplify activities to reduce stress.",
                    (friction_index * 100.0).round() as u32
                )
            }
        }
        TweakDecision::Keep => format!(
            "Your current pace seems right - {}% completion with manageable difficulty.",
            percent
        ),
    }
}

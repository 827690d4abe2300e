//! Behavioral signal derivation
//!
//! Pure feature engineering over a window of history records. Every
//! computation re-queries the repository for the window it needs, takes an
//! explicit `now` anchor, and falls back to a neutral default when the window
//! is empty or the fetch fails. Nothing here mutates state.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use chrono::{DateTime, Local, Timelike, Utc};
use regex::Regex;
use tracing::warn;

use crate::models::{ActionInstance, ActionTemplate, NoveltyTolerance};
use crate::repository::{DateRange, HistoryRepository};

/// Default lookback for outcome-rate style signals.
pub const SHORT_WINDOW_DAYS: i64 = 7;
/// Default lookback for preference style signals.
pub const LONG_WINDOW_DAYS: i64 = 14;
/// Duration assumed when the family has no completions yet.
pub const DEFAULT_DURATION_MINUTES: u32 = 10;

/// Note fragments that indicate a stressful moment. Matched as
/// case-insensitive substrings.
pub const STRESS_KEYWORDS: [&str; 6] = [
    "overwhelmed",
    "meltdown",
    "tears",
    "frustrated",
    "angry",
    "upset",
];

fn stress_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let alternation = STRESS_KEYWORDS.join("|");
        Regex::new(&format!("(?i){}", alternation)).expect("static keyword pattern compiles")
    })
}

/// True if a caregiver note contains any stress keyword.
pub fn is_stress_note(note: &str) -> bool {
    stress_pattern().is_match(note)
}

/// Hour bucket (0..24) of a timestamp in the caregiver's local time.
pub fn local_hour(at: DateTime<Utc>) -> u32 {
    at.with_timezone(&Local).hour()
}

/// Derives behavioral signals from the interaction history.
///
/// Stateless given a repository snapshot: two calls with the same repository
/// contents and the same `now` return the same values.
pub struct SignalsEngine<'a> {
    repo: &'a dyn HistoryRepository,
}

impl<'a> SignalsEngine<'a> {
    pub fn new(repo: &'a dyn HistoryRepository) -> Self {
        Self { repo }
    }

    /// Completion rate per tag over the window.
    ///
    /// Every tag on every template that appears in an instance inside the
    /// window accumulates done vs. total occurrences. Tags with no
    /// occurrences are omitted; callers default missing tags to 0.5
    /// ("unknown, assume neutral").
    pub fn success_rate_by_tag(
        &self,
        focus_id: &str,
        now: DateTime<Utc>,
        days: i64,
    ) -> HashMap<String, f64> {
        let range = DateRange::lookback(now, days);
        let instances = self.instances(range, Some(focus_id));
        let templates = self.templates(focus_id);

        let by_id: HashMap<&str, &ActionTemplate> =
            templates.iter().map(|t| (t.id.as_str(), t)).collect();

        let mut stats: HashMap<&str, (u32, u32)> = HashMap::new();
        for instance in &instances {
            let Some(template) = by_id.get(instance.template_id.as_str()) else {
                continue;
            };
            for tag in &template.tags {
                let entry = stats.entry(tag.as_str()).or_insert((0, 0));
                entry.1 += 1;
                if instance.is_done() {
                    entry.0 += 1;
                }
            }
        }

        stats
            .into_iter()
            .map(|(tag, (done, total))| (tag.to_string(), done as f64 / total as f64))
            .collect()
    }

    /// Fraction of all completed instances (across all focuses) per local
    /// hour. All 24 buckets are always present; fractions sum to 1.0 over
    /// the window, or are all 0.0 when nothing was completed.
    pub fn time_of_day_heatmap(&self, now: DateTime<Utc>, days: i64) -> [f64; 24] {
        let range = DateRange::lookback(now, days);
        let instances = self.instances(range, None);

        let mut counts = [0u32; 24];
        let mut completed = 0u32;
        for instance in instances.iter().filter(|i| i.is_done()) {
            counts[local_hour(instance.date) as usize] += 1;
            completed += 1;
        }

        let mut heatmap = [0.0; 24];
        if completed > 0 {
            for (bucket, count) in heatmap.iter_mut().zip(counts) {
                *bucket = count as f64 / completed as f64;
            }
        }
        heatmap
    }

    /// Most frequent completed variant duration in the window.
    ///
    /// Ties break toward the smaller duration (first-seen maximum in
    /// ascending-duration order). 10 minutes when nothing was completed.
    pub fn bandwidth_preference(&self, focus_id: &str, now: DateTime<Utc>, days: i64) -> u32 {
        let range = DateRange::lookback(now, days);
        let instances = self.instances(range, Some(focus_id));

        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for instance in instances.iter().filter(|i| i.is_done()) {
            *counts.entry(instance.variant_duration).or_insert(0) += 1;
        }

        let mut best: Option<(u32, u32)> = None;
        for (duration, count) in counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((duration, count)),
            }
        }
        best.map(|(duration, _)| duration)
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    /// Ratio of distinct templates completed to total completions, bucketed.
    /// No completions reads as medium.
    pub fn novelty_tolerance(
        &self,
        focus_id: &str,
        now: DateTime<Utc>,
        days: i64,
    ) -> NoveltyTolerance {
        let range = DateRange::lookback(now, days);
        let instances = self.instances(range, Some(focus_id));

        let completed: Vec<&ActionInstance> =
            instances.iter().filter(|i| i.is_done()).collect();
        if completed.is_empty() {
            return NoveltyTolerance::Med;
        }

        let distinct: HashSet<&str> =
            completed.iter().map(|i| i.template_id.as_str()).collect();
        let ratio = distinct.len() as f64 / completed.len() as f64;

        if ratio >= 0.7 {
            NoveltyTolerance::High
        } else if ratio >= 0.4 {
            NoveltyTolerance::Med
        } else {
            NoveltyTolerance::Low
        }
    }

    /// Fraction of window instances that felt hard or carried a stress note.
    /// An instance counts at most once even when both conditions hold.
    pub fn friction_index(&self, focus_id: &str, now: DateTime<Utc>, days: i64) -> f64 {
        let range = DateRange::lookback(now, days);
        let instances = self.instances(range, Some(focus_id));
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

    /// Completed/total instance ratio in the window; 0.0 if none.
    pub fn streak_momentum(&self, focus_id: &str, now: DateTime<Utc>, days: i64) -> f64 {
        let range = DateRange::lookback(now, days);
        let instances = self.instances(range, Some(focus_id));
        if instances.is_empty() {
            return 0.0;
        }

        let done = instances.iter().filter(|i| i.is_done()).count();
        done as f64 / instances.len() as f64
    }

    /// Top 3 hours by heatmap value, descending, ties to the lower hour.
    pub fn peak_hours(&self, now: DateTime<Utc>, days: i64) -> Vec<u32> {
        let heatmap = self.time_of_day_heatmap(now, days);
        let mut hours: Vec<u32> = (0..24).collect();
        hours.sort_by(|a, b| {
            heatmap[*b as usize]
                .partial_cmp(&heatmap[*a as usize])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(b))
        });
        hours.truncate(3);
        hours
    }

    /// Short-window completion ratio, for the "how is this week going"
    /// glance. Same shape as streak momentum over a 3-day default.
    pub fn recent_performance(&self, focus_id: &str, now: DateTime<Utc>, days: i64) -> f64 {
        self.streak_momentum(focus_id, now, days)
    }

    fn instances(&self, range: DateRange, focus_id: Option<&str>) -> Vec<ActionInstance> {
        match self.repo.fetch_action_instances(range, focus_id) {
            Ok(instances) => instances,
            Err(e) => {
                warn!(error = %e, "Instance fetch failed; treating window as empty");
                Vec::new()
            }
        }
    }

    fn templates(&self, focus_id: &str) -> Vec<ActionTemplate> {
        match self.repo.fetch_action_templates(focus_id) {
            Ok(templates) => templates,
            Err(e) => {
                warn!(error = %e, focus_id, "Template fetch failed; treating catalog as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeltDifficulty, InstanceStatus};
    use crate::test_utils::{instance, template, InstanceExt, MemoryRepository};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // Anchored through Local so hour-based assertions hold in any zone.
        Local
            .with_ymd_and_hms(2026, 3, 10, 9, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    /// A timestamp the day before `now`, at the given local hour. Windows
    /// are half-open at `now`, so test instances land strictly inside.
    fn logged_at(hour: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2026, 3, 9, hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn logged() -> DateTime<Utc> {
        logged_at(9)
    }

    #[test]
    fn test_stress_note_matching_is_case_insensitive_substring() {
        assert!(is_stress_note("Total MELTDOWN before dinner"));
        assert!(is_stress_note("felt overwhelmed today"));
        assert!(!is_stress_note("calm and happy"));
    }

    #[test]
    fn test_success_rate_all_done_is_one() {
        let repo = MemoryRepository::new()
            .with_template(template("t1", "independence", &["initiative"]))
            .with_instance(instance("i1", "independence", "t1", logged(), InstanceStatus::Done))
            .with_instance(instance("i2", "independence", "t1", logged(), InstanceStatus::Done));

        let signals = SignalsEngine::new(&repo);
        let rates = signals.success_rate_by_tag("independence", now(), SHORT_WINDOW_DAYS);
        assert_eq!(rates.get("initiative"), Some(&1.0));
    }

    #[test]
    fn test_success_rate_counts_non_done_in_total() {
        let repo = MemoryRepository::new()
            .with_template(template("t1", "independence", &["initiative"]))
            .with_instance(instance("i1", "independence", "t1", logged(), InstanceStatus::Done))
            .with_instance(instance("i2", "independence", "t1", logged(), InstanceStatus::Skipped));

        let signals = SignalsEngine::new(&repo);
        let rates = signals.success_rate_by_tag("independence", now(), SHORT_WINDOW_DAYS);
        assert_eq!(rates.get("initiative"), Some(&0.5));
    }

    #[test]
    fn test_success_rate_empty_window_returns_empty_map() {
        let repo =
            MemoryRepository::new().with_template(template("t1", "independence", &["initiative"]));
        let signals = SignalsEngine::new(&repo);
        assert!(signals
            .success_rate_by_tag("independence", now(), SHORT_WINDOW_DAYS)
            .is_empty());
    }

    #[test]
    fn test_heatmap_fractions_sum_to_one() {
        let at_nine = logged_at(9);
        let at_twenty = logged_at(20);
        let repo = MemoryRepository::new()
            .with_template(template("t1", "independence", &[]))
            .with_instance(instance("i1", "independence", "t1", at_nine, InstanceStatus::Done))
            .with_instance(instance("i2", "independence", "t1", at_nine, InstanceStatus::Done))
            .with_instance(instance("i3", "independence", "t1", at_twenty, InstanceStatus::Done))
            .with_instance(instance("i4", "independence", "t1", at_twenty, InstanceStatus::Skipped));

        let signals = SignalsEngine::new(&repo);
        let heatmap = signals.time_of_day_heatmap(now(), LONG_WINDOW_DAYS);

        assert_eq!(heatmap[9], 2.0 / 3.0);
        assert_eq!(heatmap[20], 1.0 / 3.0);
        assert!((heatmap.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_heatmap_all_zero_without_completions() {
        let repo = MemoryRepository::new();
        let signals = SignalsEngine::new(&repo);
        assert!(signals
            .time_of_day_heatmap(now(), LONG_WINDOW_DAYS)
            .iter()
            .all(|f| *f == 0.0));
    }

    #[test]
    fn test_bandwidth_preference_mode() {
        let repo = MemoryRepository::new()
            .with_instance(
                instance("i1", "independence", "t1", logged(), InstanceStatus::Done).duration(5),
            )
            .with_instance(
                instance("i2", "independence", "t1", logged(), InstanceStatus::Done).duration(5),
            )
            .with_instance(
                instance("i3", "independence", "t1", logged(), InstanceStatus::Done).duration(10),
            );

        let signals = SignalsEngine::new(&repo);
        assert_eq!(
            signals.bandwidth_preference("independence", now(), LONG_WINDOW_DAYS),
            5
        );
    }

    #[test]
    fn test_bandwidth_preference_tie_breaks_to_smaller_duration() {
        let repo = MemoryRepository::new()
            .with_instance(
                instance("i1", "independence", "t1", logged(), InstanceStatus::Done).duration(20),
            )
            .with_instance(
                instance("i2", "independence", "t1", logged(), InstanceStatus::Done).duration(5),
            );

        let signals = SignalsEngine::new(&repo);
        assert_eq!(
            signals.bandwidth_preference("independence", now(), LONG_WINDOW_DAYS),
            5
        );
    }

    #[test]
    fn test_bandwidth_preference_defaults_to_ten() {
        let repo = MemoryRepository::new();
        let signals = SignalsEngine::new(&repo);
        assert_eq!(
            signals.bandwidth_preference("independence", now(), LONG_WINDOW_DAYS),
            DEFAULT_DURATION_MINUTES
        );
    }

    #[test]
    fn test_novelty_tolerance_buckets() {
        // 3 completions over 3 distinct templates -> ratio 1.0 -> high
        let repo = MemoryRepository::new()
            .with_instance(instance("i1", "independence", "t1", logged(), InstanceStatus::Done))
            .with_instance(instance("i2", "independence", "t2", logged(), InstanceStatus::Done))
            .with_instance(instance("i3", "independence", "t3", logged(), InstanceStatus::Done));
        let signals = SignalsEngine::new(&repo);
        assert_eq!(
            signals.novelty_tolerance("independence", now(), LONG_WINDOW_DAYS),
            NoveltyTolerance::High
        );

        // 5 completions over 1 template -> ratio 0.2 -> low
        let mut repo = MemoryRepository::new();
        for i in 0..5 {
            repo = repo.with_instance(instance(
                &format!("i{}", i),
                "independence",
                "t1",
                logged(),
                InstanceStatus::Done,
            ));
        }
        let signals = SignalsEngine::new(&repo);
        assert_eq!(
            signals.novelty_tolerance("independence", now(), LONG_WINDOW_DAYS),
            NoveltyTolerance::Low
        );
    }

    #[test]
    fn test_novelty_tolerance_defaults_to_med() {
        let repo = MemoryRepository::new();
        let signals = SignalsEngine::new(&repo);
        assert_eq!(
            signals.novelty_tolerance("independence", now(), LONG_WINDOW_DAYS),
            NoveltyTolerance::Med
        );
    }

    #[test]
    fn test_friction_index_counts_each_instance_once() {
        // 4 instances: one hard, one stress note, two neutral -> 0.5.
        let repo = MemoryRepository::new()
            .with_instance(
                instance("i1", "independence", "t1", logged(), InstanceStatus::Done)
                    .difficulty(FeltDifficulty::Hard),
            )
            .with_instance(
                instance("i2", "independence", "t1", logged(), InstanceStatus::Done)
                    .note("felt overwhelmed"),
            )
            .with_instance(instance("i3", "independence", "t1", logged(), InstanceStatus::Done))
            .with_instance(instance("i4", "independence", "t1", logged(), InstanceStatus::Skipped));

        let signals = SignalsEngine::new(&repo);
        assert_eq!(signals.friction_index("independence", now(), SHORT_WINDOW_DAYS), 0.5);
    }

    #[test]
    fn test_friction_index_double_match_still_single_count() {
        let repo = MemoryRepository::new()
            .with_instance(
                instance("i1", "independence", "t1", logged(), InstanceStatus::Done)
                    .difficulty(FeltDifficulty::Hard)
                    .note("angry tears"),
            )
            .with_instance(instance("i2", "independence", "t1", logged(), InstanceStatus::Done));

        let signals = SignalsEngine::new(&repo);
        assert_eq!(signals.friction_index("independence", now(), SHORT_WINDOW_DAYS), 0.5);
    }

    #[test]
    fn test_friction_index_empty_window_is_zero() {
        let repo = MemoryRepository::new();
        let signals = SignalsEngine::new(&repo);
        assert_eq!(signals.friction_index("independence", now(), SHORT_WINDOW_DAYS), 0.0);
    }

    #[test]
    fn test_streak_momentum_ratio() {
        let repo = MemoryRepository::new()
            .with_instance(instance("i1", "independence", "t1", logged(), InstanceStatus::Done))
            .with_instance(instance("i2", "independence", "t1", logged(), InstanceStatus::Snoozed))
            .with_instance(instance("i3", "independence", "t1", logged(), InstanceStatus::Skipped))
            .with_instance(instance("i4", "independence", "t1", logged(), InstanceStatus::Done));

        let signals = SignalsEngine::new(&repo);
        assert_eq!(signals.streak_momentum("independence", now(), SHORT_WINDOW_DAYS), 0.5);
    }

    #[test]
    fn test_peak_hours_orders_by_value_then_hour() {
        let repo = MemoryRepository::new()
            .with_instance(instance("i1", "independence", "t1", logged_at(7), InstanceStatus::Done))
            .with_instance(instance("i2", "independence", "t1", logged_at(7), InstanceStatus::Done))
            .with_instance(instance("i3", "independence", "t1", logged_at(19), InstanceStatus::Done))
            .with_instance(instance("i4", "independence", "t1", logged_at(12), InstanceStatus::Done));

        let signals = SignalsEngine::new(&repo);
        let peaks = signals.peak_hours(now(), LONG_WINDOW_DAYS);
        // 7 leads; 12 and 19 tie, lower hour first.
        assert_eq!(peaks, vec![7, 12, 19]);
    }
}

//! Daily action recommendation
//!
//! Combines the derived signals into a weighted relevance score per catalog
//! template, ranks with deterministic tie-breaking, and guarantees a
//! non-empty suggestion whenever the focus has any templates at all.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::explain::ExplainWhyBuilder;
use crate::models::{ActionTemplate, NoveltyTolerance};
use crate::repository::{DateRange, HistoryRepository};
use crate::signals::{
    is_stress_note, local_hour, SignalsEngine, LONG_WINDOW_DAYS, SHORT_WINDOW_DAYS,
};

/// Contraindication honored when the prior day looked dysregulated.
pub const SKIP_IF_DYSREGULATED: &str = "skip_if_dysregulated";

/// Weights and clamps for the relevance score.
///
/// `weight_base` is a fixed bonus baked into the weighting; it is not
/// data-dependent and exists for score parity with the shipped tuning.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub weight_focus_match: f64,
    pub weight_success: f64,
    pub weight_bandwidth: f64,
    pub weight_hour: f64,
    pub weight_novelty: f64,
    pub weight_base: f64,
    pub weight_friction: f64,
    /// Durations the catalog actually ships; a preference outside this set
    /// falls back to `fallback_duration`.
    pub allowed_durations: [u32; 3],
    pub fallback_duration: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_focus_match: 0.35,
            weight_success: 0.20,
            weight_bandwidth: 0.15,
            weight_hour: 0.10,
            weight_novelty: 0.10,
            weight_base: 0.10,
            weight_friction: 0.10,
            allowed_durations: [5, 10, 20],
            fallback_duration: 5,
        }
    }
}

/// One day's suggestion: 2–3 chosen actions with their variant durations and
/// a single rationale line.
#[derive(Debug, Clone)]
pub struct RankedSuggestion {
    pub headline: String,
    pub actions: Vec<ActionTemplate>,
    /// Chosen duration per action, parallel to `actions`.
    pub chosen_variants: Vec<u32>,
    pub why_summary: String,
}

impl RankedSuggestion {
    fn empty(focus_id: &str) -> Self {
        Self {
            headline: headline(focus_id).to_string(),
            actions: Vec::new(),
            chosen_variants: Vec::new(),
            why_summary: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn headline(focus_id: &str) -> &'static str {
    match focus_id {
        "independence" => "You pick the plan; I'm backup",
        "emotion_skills" => "Name your feeling, invite theirs",
        _ => "Try this today...",
    }
}

/// Scores and ranks catalog templates for one focus area.
pub struct RecommenderEngine<'a> {
    repo: &'a dyn HistoryRepository,
    signals: SignalsEngine<'a>,
    explain: ExplainWhyBuilder,
    config: ScoringConfig,
}

impl<'a> RecommenderEngine<'a> {
    pub fn new(repo: &'a dyn HistoryRepository) -> Self {
        Self::with_config(repo, ScoringConfig::default())
    }

    pub fn with_config(repo: &'a dyn HistoryRepository, config: ScoringConfig) -> Self {
        Self {
            repo,
            signals: SignalsEngine::new(repo),
            explain: ExplainWhyBuilder::new(),
            config,
        }
    }

    /// Rank templates for `focus_id` at the given moment.
    ///
    /// Total over the repository snapshot: storage failures read as empty
    /// data, and the result carries zero actions only when the focus has no
    /// templates at all.
    pub fn rank(&self, focus_id: &str, now: DateTime<Utc>) -> RankedSuggestion {
        let candidates = match self.repo.fetch_action_templates(focus_id) {
            Ok(templates) => templates,
            Err(e) => {
                warn!(error = %e, focus_id, "Template fetch failed; returning empty suggestion");
                Vec::new()
            }
        };
        if candidates.is_empty() {
            return RankedSuggestion::empty(focus_id);
        }

        let filtered = self.filter_contraindicated(&candidates, focus_id, now);

        // Signals, computed once per call, with safe defaults throughout.
        let rates = self.signals.success_rate_by_tag(focus_id, now, SHORT_WINDOW_DAYS);
        let raw_pref = self.signals.bandwidth_preference(focus_id, now, LONG_WINDOW_DAYS);
        let pref = if self.config.allowed_durations.contains(&raw_pref) {
            raw_pref
        } else {
            self.config.fallback_duration
        };
        let hour = local_hour(now);
        let heat = self.signals.time_of_day_heatmap(now, LONG_WINDOW_DAYS)[hour as usize];
        let novelty_ok = matches!(
            self.signals.novelty_tolerance(focus_id, now, LONG_WINDOW_DAYS),
            NoveltyTolerance::Med | NoveltyTolerance::High
        );
        let friction = self
            .signals
            .friction_index(focus_id, now, SHORT_WINDOW_DAYS)
            .clamp(0.0, 1.0);
        let pins = match self.repo.fetch_focus_area(focus_id) {
            Ok(Some(focus)) => focus.pinned_micro_skill_titles,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, focus_id, "Focus fetch failed; scoring without pins");
                Vec::new()
            }
        };

        let mut scored: Vec<(f64, &ActionTemplate)> = filtered
            .iter()
            .map(|tpl| {
                let focus_match = score_focus_match(tpl, &pins);
                let success = score_success(tpl, &rates);
                let bandwidth = if tpl.variants.iter().any(|v| v.duration_minutes == pref) {
                    1.0
                } else {
                    0.5
                };
                let novelty = if novelty_ok { 0.2 } else { 0.0 };

                let c = &self.config;
                let score = c.weight_focus_match * focus_match
                    + c.weight_success * success
                    + c.weight_bandwidth * bandwidth
                    + c.weight_hour * heat
                    + c.weight_novelty * novelty
                    + c.weight_base * 1.0
                    - c.weight_friction * friction;
                (score, *tpl)
            })
            .collect();

        // Stable sort keeps catalog order for equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let chosen: Vec<&ActionTemplate> = if scored.len() >= 2 {
            scored.iter().take(scored.len().min(3)).map(|(_, t)| *t).collect()
        } else {
            // Filtering left fewer than two; take the head of the catalog
            // rather than returning a lone action when more exist.
            candidates.iter().take(2).collect()
        };

        let chosen_variants: Vec<u32> = chosen
            .iter()
            .map(|tpl| {
                let durations = tpl.variant_durations();
                if durations.contains(&pref) {
                    pref
                } else {
                    durations
                        .first()
                        .copied()
                        .unwrap_or(self.config.fallback_duration)
                }
            })
            .collect();

        let why_duration = most_common_duration(&chosen_variants, pref);
        let why_summary = self.explain.build(focus_id, why_duration, hour, friction);

        debug!(
            focus_id,
            candidates = candidates.len(),
            chosen = chosen.len(),
            preferred_duration = pref,
            "Ranked daily suggestion"
        );

        RankedSuggestion {
            headline: headline(focus_id).to_string(),
            actions: chosen.into_iter().cloned().collect(),
            chosen_variants,
            why_summary,
        }
    }

    /// Drop templates contraindicated for dysregulated days when the prior
    /// 24 hours carried a stress note. Never empties the set: if every
    /// candidate would be dropped, scoring proceeds unfiltered.
    fn filter_contraindicated<'t>(
        &self,
        candidates: &'t [ActionTemplate],
        focus_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<&'t ActionTemplate> {
        let last_day = DateRange::lookback(now, 1);
        let dysregulated = match self.repo.fetch_action_instances(last_day, Some(focus_id)) {
            Ok(instances) => instances
                .iter()
                .any(|i| i.note.as_deref().is_some_and(is_stress_note)),
            Err(e) => {
                warn!(error = %e, focus_id, "Instance fetch failed; skipping contraindication filter");
                false
            }
        };

        if !dysregulated {
            return candidates.iter().collect();
        }

        let kept: Vec<&ActionTemplate> = candidates
            .iter()
            .filter(|t| !t.contraindications.iter().any(|c| c == SKIP_IF_DYSREGULATED))
            .collect();

        if kept.is_empty() {
            debug!(focus_id, "Contraindication filter would empty the set; ignoring it");
            candidates.iter().collect()
        } else {
            kept
        }
    }
}

fn score_focus_match(template: &ActionTemplate, pinned: &[String]) -> f64 {
    if pinned.is_empty() {
        return 0.6;
    }
    let title = template.title.to_lowercase();
    if pinned.iter().any(|p| title.contains(&p.to_lowercase())) {
        1.0
    } else {
        0.6
    }
}

fn score_success(
    template: &ActionTemplate,
    rates: &std::collections::HashMap<String, f64>,
) -> f64 {
    if template.tags.is_empty() {
        return 0.5;
    }
    let sum: f64 = template
        .tags
        .iter()
        .map(|tag| rates.get(tag).copied().unwrap_or(0.5))
        .sum();
    sum / template.tags.len() as f64
}

/// Statistical mode; frequency ties resolve to the smallest duration.
fn most_common_duration(durations: &[u32], default: u32) -> u32 {
    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for d in durations {
        *counts.entry(*d).or_insert(0) += 1;
    }
    let mut best: Option<(u32, u32)> = None;
    for (duration, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((duration, count)),
        }
    }
    best.map(|(duration, _)| duration).unwrap_or(default)
}

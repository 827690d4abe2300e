//! Test utilities: in-memory repository and fixture builders
//!
//! `MemoryRepository` is a plain-Vec `HistoryRepository` for engine tests, so
//! unit tests don't need a SQLite file. It can also be switched into a
//! failing mode to exercise the degrade-gracefully paths.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{
    ActionInstance, ActionTemplate, FeltDifficulty, FocusArea, InstanceStatus, TemplateVariant,
    WeeklySummary,
};
use crate::repository::{DateRange, HistoryRepository};

/// In-memory `HistoryRepository` backed by Vecs.
#[derive(Default)]
pub struct MemoryRepository {
    templates: Vec<ActionTemplate>,
    focuses: Vec<FocusArea>,
    instances: Mutex<Vec<ActionInstance>>,
    summaries: Mutex<Vec<WeeklySummary>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: ActionTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn with_focus(mut self, focus: FocusArea) -> Self {
        self.focuses.push(focus);
        self
    }

    pub fn with_instance(self, instance: ActionInstance) -> Self {
        self.instances.lock().unwrap().push(instance);
        self
    }

    /// Every fetch returns a storage error.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Every save returns a storage error.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn saved_instances(&self) -> Vec<ActionInstance> {
        self.instances.lock().unwrap().clone()
    }

    pub fn saved_summaries(&self) -> Vec<WeeklySummary> {
        self.summaries.lock().unwrap().clone()
    }

    fn read_error() -> Error {
        Error::InvalidData("simulated storage read failure".into())
    }
}

impl HistoryRepository for MemoryRepository {
    fn fetch_action_templates(&self, focus_id: &str) -> Result<Vec<ActionTemplate>> {
        if self.fail_reads {
            return Err(Self::read_error());
        }
        Ok(self
            .templates
            .iter()
            .filter(|t| t.focus_id == focus_id)
            .cloned()
            .collect())
    }

    fn fetch_action_instances(
        &self,
        range: DateRange,
        focus_id: Option<&str>,
    ) -> Result<Vec<ActionInstance>> {
        if self.fail_reads {
            return Err(Self::read_error());
        }
        Ok(self
            .instances
            .lock()
            .unwrap()
            .iter()
            .filter(|i| range.contains(i.date))
            .filter(|i| focus_id.map_or(true, |f| i.focus_id == f))
            .cloned()
            .collect())
    }

    fn fetch_focus_area(&self, focus_id: &str) -> Result<Option<FocusArea>> {
        if self.fail_reads {
            return Err(Self::read_error());
        }
        Ok(self.focuses.iter().find(|f| f.id == focus_id).cloned())
    }

    fn save_action_instance(&self, instance: &ActionInstance) -> Result<()> {
        if self.fail_writes {
            return Err(Error::InvalidData("simulated storage write failure".into()));
        }
        let mut instances = self.instances.lock().unwrap();
        if !instances.iter().any(|i| i.id == instance.id) {
            instances.push(instance.clone());
        }
        Ok(())
    }

    fn save_weekly_summary(&self, summary: &WeeklySummary) -> Result<()> {
        if self.fail_writes {
            return Err(Error::InvalidData("simulated storage write failure".into()));
        }
        let mut summaries = self.summaries.lock().unwrap();
        summaries.retain(|s| {
            !(s.focus_id == summary.focus_id && s.week_start == summary.week_start)
        });
        summaries.push(summary.clone());
        Ok(())
    }
}

/// Template fixture with 5- and 10-minute variants.
pub fn template(id: &str, focus_id: &str, tags: &[&str]) -> ActionTemplate {
    ActionTemplate {
        id: id.to_string(),
        focus_id: focus_id.to_string(),
        title: format!("Action {}", id),
        why_line: "Small reps build the skill".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        difficulty: 2,
        variants: vec![
            TemplateVariant {
                duration_minutes: 5,
                steps: vec!["Set up".to_string(), "Do the thing".to_string()],
            },
            TemplateVariant {
                duration_minutes: 10,
                steps: vec!["Set up".to_string(), "Go deeper".to_string()],
            },
        ],
        contraindications: vec![],
        content_version: 1,
    }
}

/// Instance fixture with a 10-minute duration and no note.
pub fn instance(
    id: &str,
    focus_id: &str,
    template_id: &str,
    date: DateTime<Utc>,
    status: InstanceStatus,
) -> ActionInstance {
    ActionInstance {
        id: id.to_string(),
        date,
        focus_id: focus_id.to_string(),
        template_id: template_id.to_string(),
        variant_duration: 10,
        status,
        felt_difficulty: None,
        note: None,
    }
}

/// Focus-area fixture with no pins.
pub fn focus(id: &str, name: &str) -> FocusArea {
    FocusArea {
        id: id.to_string(),
        name: name.to_string(),
        active: true,
        started_at: Utc::now(),
        building_blocks: vec![],
        pinned_micro_skill_titles: vec![],
    }
}

/// Builder-style tweaks for instance fixtures.
pub trait InstanceExt: Sized {
    fn duration(self, minutes: u32) -> Self;
    fn difficulty(self, felt: FeltDifficulty) -> Self;
    fn note(self, text: &str) -> Self;
}

impl InstanceExt for ActionInstance {
    fn duration(mut self, minutes: u32) -> Self {
        self.variant_duration = minutes;
        self
    }

    fn difficulty(mut self, felt: FeltDifficulty) -> Self {
        self.felt_difficulty = Some(felt);
        self
    }

    fn note(mut self, text: &str) -> Self {
        self.note = Some(text.to_string());
        self
    }
}

/// Focus-area fixture tweaks.
pub trait FocusExt: Sized {
    fn pinned(self, titles: &[&str]) -> Self;
}

impl FocusExt for FocusArea {
    fn pinned(mut self, titles: &[&str]) -> Self {
        self.pinned_micro_skill_titles = titles.iter().map(|t| t.to_string()).collect();
        self
    }
}

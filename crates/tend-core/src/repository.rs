//! Repository seam between the engines and the history store
//!
//! The engines never hold live references into a persistence layer; they ask
//! a `HistoryRepository` for plain data and treat any storage failure the
//! same as "no data". The SQLite `Database` implements this trait; tests use
//! the in-memory implementation from `test_utils`.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::error::Result;
use crate::models::{ActionInstance, ActionTemplate, FocusArea, WeeklySummary};

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days` days ending at `end`.
    pub fn lookback(end: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// The seven days starting at midnight UTC of `week_start`.
    pub fn week(week_start: NaiveDate) -> Self {
        let start = week_start.and_time(NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + Duration::days(7),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Read and append access to the action catalog and the interaction history.
///
/// Fetches return empty collections rather than erroring on "not found";
/// only true storage failures surface as `Err`, and callers in the engines
/// degrade those to empty results as well.
pub trait HistoryRepository {
    /// All catalog templates for one focus area, in catalog order.
    fn fetch_action_templates(&self, focus_id: &str) -> Result<Vec<ActionTemplate>>;

    /// Logged instances inside `range`, optionally restricted to one focus.
    fn fetch_action_instances(
        &self,
        range: DateRange,
        focus_id: Option<&str>,
    ) -> Result<Vec<ActionInstance>>;

    /// Focus-area configuration, if the id is known.
    fn fetch_focus_area(&self, focus_id: &str) -> Result<Option<FocusArea>>;

    /// Append one logged outcome. Idempotent on `instance.id`: replaying the
    /// same id is a no-op, never a duplicate row.
    fn save_action_instance(&self, instance: &ActionInstance) -> Result<()>;

    /// Upsert keyed by `(focus_id, week_start)`; a repeated decision for the
    /// same week supersedes the earlier record.
    fn save_weekly_summary(&self, summary: &WeeklySummary) -> Result<()>;
}

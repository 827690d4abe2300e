//! Rationale copy for a day's suggestion
//!
//! Deterministic template over four facts: time of day, preferred duration,
//! friction phrasing, and the focus display name. The sentence itself is
//! advisory UI copy; the classification rules are the contract.

/// Builds the one-line "why these actions" rationale.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplainWhyBuilder;

impl ExplainWhyBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Compose the rationale sentence.
    ///
    /// Hours 5–11 read as mornings, 12–16 as afternoons, everything else as
    /// evenings. Friction above 0.4 switches to "gentle options".
    pub fn build(
        &self,
        focus_id: &str,
        preferred_duration: u32,
        hour: u32,
        friction_index: f64,
    ) -> String {
        let when = match hour {
            5..=11 => "mornings",
            12..=16 => "afternoons",
            _ => "evenings",
        };
        let friction = if friction_index > 0.4 {
            "gentle options"
        } else {
            "a small stretch"
        };
        let focus_name = Self::display_name(focus_id);

        format!(
            "Because {} and {}-minute actions work for you, we're offering {} for {} today.",
            when, preferred_duration, friction, focus_name
        )
    }

    fn display_name(focus_id: &str) -> &str {
        match focus_id {
            "independence" => "Independence",
            "emotion_skills" => "Emotion Skills",
            _ => "your focus",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_buckets() {
        let builder = ExplainWhyBuilder::new();
        assert!(builder.build("independence", 10, 5, 0.0).contains("mornings"));
        assert!(builder.build("independence", 10, 11, 0.0).contains("mornings"));
        assert!(builder.build("independence", 10, 12, 0.0).contains("afternoons"));
        assert!(builder.build("independence", 10, 16, 0.0).contains("afternoons"));
        assert!(builder.build("independence", 10, 17, 0.0).contains("evenings"));
        assert!(builder.build("independence", 10, 4, 0.0).contains("evenings"));
        assert!(builder.build("independence", 10, 0, 0.0).contains("evenings"));
    }

    #[test]
    fn test_friction_phrasing_threshold() {
        let builder = ExplainWhyBuilder::new();
        assert!(builder.build("independence", 10, 9, 0.5).contains("gentle options"));
        assert!(builder.build("independence", 10, 9, 0.4).contains("a small stretch"));
    }

    #[test]
    fn test_focus_names_with_fallback() {
        let builder = ExplainWhyBuilder::new();
        assert!(builder.build("emotion_skills", 5, 9, 0.0).contains("Emotion Skills"));
        assert!(builder.build("independence", 5, 9, 0.0).contains("Independence"));
        assert!(builder.build("mystery", 5, 9, 0.0).contains("your focus"));
    }

    #[test]
    fn test_all_four_facts_present() {
        let builder = ExplainWhyBuilder::new();
        let why = builder.build("independence", 20, 8, 0.6);
        assert_eq!(
            why,
            "Because mornings and 20-minute actions work for you, we're offering \
             gentle options for Independence today."
        );
    }
}

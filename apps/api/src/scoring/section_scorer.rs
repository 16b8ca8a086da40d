use tracing::warn;

use crate::models::cv::{round2, GrammarCounts, GrammarError, Quality, Segment, SectionReport};
use crate::scoring::model::{ContentScorer, ModelError};
use crate::scoring::review::SectionReviewer;
use crate::scoring::sections::Section;

pub const MINOR_PENALTY: f64 = 0.2;
pub const SEVERE_PENALTY: f64 = 0.5;
/// Share of the section budget a final score must reach to count as Good.
pub const GOOD_THRESHOLD: f64 = 0.75;

/// Scores one segment: model content score minus the grammar penalty.
///
/// Unrecognized sections get a zeroed Missing report without touching the
/// model or the reviewer.
pub async fn score_section(
    segment: &Segment,
    model: &dyn ContentScorer,
    reviewer: &dyn SectionReviewer,
) -> Result<SectionReport, ModelError> {
    let Some(section) = Section::from_label(&segment.section) else {
        warn!("Invalid section: {}", segment.section);
        return Ok(SectionReport::missing(&segment.section));
    };

    let max_score = f64::from(section.max_score());
    let normalized = model.normalized_score(section, &segment.text)?;
    let content_score = normalized * max_score;

    let (grammar_errors_detailed, suggestions) = tokio::join!(
        reviewer.grammar_errors(&segment.text),
        reviewer.suggestions(section, &segment.text),
    );

    let grammar_errors = count_grammar_errors(&grammar_errors_detailed);
    let penalty =
        MINOR_PENALTY * grammar_errors.minor as f64 + SEVERE_PENALTY * grammar_errors.severe as f64;
    // the label is decided on the unrounded score
    let final_score = (content_score - penalty).max(0.0);

    Ok(SectionReport {
        section: segment.section.clone(),
        content_score: round2(content_score),
        final_score: round2(final_score),
        grammar_errors,
        grammar_errors_detailed,
        suggestions,
        quality: quality_for(final_score, max_score),
    })
}

/// Grammar and vocabulary issues are minor, syntax issues severe; any other
/// type is reported but not counted.
pub fn count_grammar_errors(errors: &[GrammarError]) -> GrammarCounts {
    errors
        .iter()
        .fold(GrammarCounts::default(), |mut counts, e| {
            match e.error_type.to_lowercase().as_str() {
                "grammar" | "vocabulary" => counts.minor += 1,
                "syntax" => counts.severe += 1,
                _ => {}
            }
            counts
        })
}

/// A zero-budget section with a zero score is Good, since `0 >= 0`.
pub fn quality_for(final_score: f64, max_score: f64) -> Quality {
    if final_score >= GOOD_THRESHOLD * max_score {
        Quality::Good
    } else if final_score > 0.0 {
        Quality::Weak
    } else {
        Quality::Missing
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::models::cv::Suggestion;

    /// Content scorer returning a fixed normalized score.
    pub struct FixedScorer {
        pub score: f64,
        pub calls: AtomicUsize,
    }

    impl FixedScorer {
        pub fn new(score: f64) -> Self {
            Self {
                score,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ContentScorer for FixedScorer {
        fn normalized_score(&self, _: Section, _: &str) -> Result<f64, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.score)
        }
    }

    /// Reviewer returning canned grammar errors and suggestions for non-empty text.
    #[derive(Default)]
    pub struct CannedReviewer {
        pub errors: Vec<GrammarError>,
        pub suggestions: Vec<Suggestion>,
        pub calls: AtomicUsize,
    }

    impl CannedReviewer {
        pub fn with_error_types(types: &[&str]) -> Self {
            Self {
                errors: types
                    .iter()
                    .map(|t| GrammarError {
                        error_type: t.to_string(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SectionReviewer for CannedReviewer {
        async fn grammar_errors(&self, text: &str) -> Vec<GrammarError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.is_empty() {
                return vec![];
            }
            self.errors.clone()
        }

        async fn suggestions(&self, _: Section, text: &str) -> Vec<Suggestion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.is_empty() {
                return vec![];
            }
            self.suggestions.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{CannedReviewer, FixedScorer};
    use super::*;

    #[tokio::test]
    async fn test_invalid_section_makes_no_calls() {
        let model = FixedScorer::new(0.9);
        let reviewer = CannedReviewer::with_error_types(&["syntax"]);

        let segment = Segment::new("References", "Available on request");
        let report = score_section(&segment, &model, &reviewer).await.unwrap();

        assert_eq!(report.section, "References");
        assert_eq!(report.content_score, 0.0);
        assert_eq!(report.final_score, 0.0);
        assert_eq!(report.quality, Quality::Missing);
        assert!(report.grammar_errors_detailed.is_empty());
        assert_eq!(model.calls(), 0);
        assert_eq!(reviewer.calls(), 0);
    }

    #[tokio::test]
    async fn test_penalty_applied_to_content_score() {
        // Skills has a 15 point budget; 10/15 normalized gives content 10.0
        let model = FixedScorer::new(10.0 / 15.0);
        let reviewer = CannedReviewer::with_error_types(&["Grammar", "vocabulary", "SYNTAX"]);

        let report = score_section(&Segment::new("Skills", "Rust, Go"), &model, &reviewer)
            .await
            .unwrap();

        assert_eq!(report.content_score, 10.0);
        assert_eq!(report.grammar_errors, GrammarCounts { minor: 2, severe: 1 });
        assert_eq!(report.final_score, 9.1);
        assert_eq!(report.quality, Quality::Weak);
    }

    #[tokio::test]
    async fn test_final_score_never_negative() {
        let model = FixedScorer::new(0.01);
        let reviewer = CannedReviewer::with_error_types(&["syntax", "syntax", "syntax"]);

        let report = score_section(&Segment::new("Awards", "Best paper"), &model, &reviewer)
            .await
            .unwrap();

        assert_eq!(report.final_score, 0.0);
        assert_eq!(report.quality, Quality::Missing);
    }

    #[tokio::test]
    async fn test_zero_budget_section_is_good() {
        let model = FixedScorer::new(0.7);
        let reviewer = CannedReviewer::default();

        let segment = Segment::new("Hobbies & Interests", "Chess");
        let report = score_section(&segment, &model, &reviewer).await.unwrap();

        assert_eq!(report.content_score, 0.0);
        assert_eq!(report.quality, Quality::Good);
    }

    #[tokio::test]
    async fn test_quality_decided_before_rounding() {
        let reviewer = CannedReviewer::default();
        let skills = Segment::new("Skills", "Rust");

        // 11.249 rounds to the 11.25 threshold but stays below it
        let model = FixedScorer::new(11.249 / 15.0);
        let report = score_section(&skills, &model, &reviewer).await.unwrap();
        assert_eq!(report.final_score, 11.25);
        assert_eq!(report.quality, Quality::Weak);

        // 0.004 rounds to zero but is still a positive score
        let model = FixedScorer::new(0.004 / 15.0);
        let report = score_section(&skills, &model, &reviewer).await.unwrap();
        assert_eq!(report.final_score, 0.0);
        assert_eq!(report.quality, Quality::Weak);
    }

    #[test]
    fn test_unknown_error_types_uncounted() {
        let errors: Vec<GrammarError> = ["Spelling", "style", "grammar"]
            .iter()
            .map(|t| GrammarError {
                error_type: t.to_string(),
                ..Default::default()
            })
            .collect();
        assert_eq!(count_grammar_errors(&errors), GrammarCounts { minor: 1, severe: 0 });
    }

    #[test]
    fn test_quality_thresholds() {
        assert_eq!(quality_for(7.5, 10.0), Quality::Good);
        assert_eq!(quality_for(7.49, 10.0), Quality::Weak);
        assert_eq!(quality_for(0.0, 10.0), Quality::Missing);
    }
}

use futures::future::try_join_all;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::cv::{round2, CvReport, Segment, DEFAULT_CV_ID};
use crate::scoring::model::ContentScorer;
use crate::scoring::review::SectionReviewer;
use crate::scoring::section_scorer::score_section;
use crate::scoring::sections::total_max_score;

/// Scores every segment concurrently and folds the results into one report.
///
/// Section order follows `segments`. The first failing section aborts the
/// whole report.
pub async fn aggregate(
    segments: &[Segment],
    model: &dyn ContentScorer,
    reviewer: &dyn SectionReviewer,
) -> Result<CvReport, AppError> {
    let sections = try_join_all(
        segments
            .iter()
            .map(|segment| score_section(segment, model, reviewer)),
    )
    .await
    .map_err(|e| {
        error!("Error scoring segments: {e}");
        AppError::Scoring(format!("Failed to score CV: {e}"))
    })?;

    let total_content_score: f64 = sections.iter().map(|s| s.content_score).sum();
    let total_final_score: f64 = sections.iter().map(|s| s.final_score).sum();
    let total_grammar_errors = sections.iter().map(|s| s.grammar_errors.total()).sum();
    let max_total = f64::from(total_max_score());

    let cv_id = segments
        .first()
        .and_then(|s| s.cv_id.clone())
        .unwrap_or_else(|| DEFAULT_CV_ID.to_string());

    info!(
        "Scored {} sections: final {:.2}/{max_total}",
        sections.len(),
        total_final_score
    );

    Ok(CvReport {
        cv_id,
        sections,
        total_content_score: round2(total_content_score),
        total_final_score: round2(total_final_score),
        content_score_100: round2(total_content_score / max_total * 100.0),
        final_score_100: round2(total_final_score / max_total * 100.0),
        total_grammar_errors,
        processing_times: None,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::models::cv::{GrammarError, Quality, Suggestion};
    use crate::scoring::model::ModelError;
    use crate::scoring::section_scorer::testing::{CannedReviewer, FixedScorer};
    use crate::scoring::sections::Section;

    fn full_cv() -> Vec<Segment> {
        Section::ALL
            .iter()
            .map(|s| Segment::new(s.label(), format!("{} text", s.label())))
            .collect()
    }

    struct FailingScorer;

    impl ContentScorer for FailingScorer {
        fn normalized_score(&self, _: Section, _: &str) -> Result<f64, ModelError> {
            Err(ModelError::Invalid("feature width".into()))
        }
    }

    /// Reviewer whose every call takes one second.
    struct SlowReviewer;

    #[async_trait]
    impl SectionReviewer for SlowReviewer {
        async fn grammar_errors(&self, _: &str) -> Vec<GrammarError> {
            tokio::time::sleep(Duration::from_secs(1)).await;
            vec![]
        }

        async fn suggestions(&self, _: Section, _: &str) -> Vec<Suggestion> {
            tokio::time::sleep(Duration::from_secs(1)).await;
            vec![]
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sections_and_reviews_run_concurrently() {
        let segments = full_cv();
        let start = Instant::now();

        let report = aggregate(&segments, &FixedScorer::new(0.5), &SlowReviewer)
            .await
            .unwrap();

        // run one after another this would take two seconds per section
        let elapsed = start.elapsed();
        assert_eq!(report.sections.len(), segments.len());
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_scaled_totals_match_raw_totals() {
        let model = FixedScorer::new(0.6);
        let reviewer = CannedReviewer::default();

        let report = aggregate(&full_cv(), &model, &reviewer).await.unwrap();

        assert_eq!(report.sections.len(), Section::ALL.len());
        assert_eq!(report.total_content_score, 60.0);
        assert_eq!(report.content_score_100, report.total_content_score);
        assert_eq!(report.final_score_100, report.total_final_score);
        assert_eq!(report.cv_id, DEFAULT_CV_ID);
        assert!(report.processing_times.is_none());
    }

    #[tokio::test]
    async fn test_section_order_and_grammar_totals() {
        let model = FixedScorer::new(1.0);
        let reviewer = CannedReviewer::with_error_types(&["grammar", "syntax", "style"]);
        let segments = vec![
            Segment::new("Education", "BSc"),
            Segment::new("Unknown", "???"),
            Segment::new("Summary", "Engineer"),
        ];

        let report = aggregate(&segments, &model, &reviewer).await.unwrap();

        let order: Vec<&str> = report.sections.iter().map(|s| s.section.as_str()).collect();
        assert_eq!(order, ["Education", "Unknown", "Summary"]);
        assert_eq!(report.sections[1].quality, Quality::Missing);
        // two counted errors in each of the two recognized sections
        assert_eq!(report.total_grammar_errors, 4);
        assert_eq!(report.total_content_score, 20.0);
        assert_eq!(report.total_final_score, 18.6);
    }

    #[tokio::test]
    async fn test_cv_id_taken_from_first_segment() {
        let model = FixedScorer::new(0.5);
        let reviewer = CannedReviewer::default();
        let mut segments = full_cv();
        segments[0].cv_id = Some("CV-42".into());

        let report = aggregate(&segments, &model, &reviewer).await.unwrap();
        assert_eq!(report.cv_id, "CV-42");
    }

    #[tokio::test]
    async fn test_repeated_scoring_is_identical() {
        let model = FixedScorer::new(0.37);
        let reviewer = CannedReviewer {
            errors: vec![GrammarError {
                error_type: "vocabulary".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let segments = full_cv();

        let first = aggregate(&segments, &model, &reviewer).await.unwrap();
        let second = aggregate(&segments, &model, &reviewer).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_section_failure_aborts_report() {
        let reviewer = CannedReviewer::default();
        match aggregate(&full_cv(), &FailingScorer, &reviewer).await {
            Err(AppError::Scoring(msg)) => assert!(msg.starts_with("Failed to score CV")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_segments_score_zero() {
        let report = aggregate(&[], &FixedScorer::new(1.0), &CannedReviewer::default())
            .await
            .unwrap();
        assert!(report.sections.is_empty());
        assert_eq!(report.final_score_100, 0.0);
    }
}

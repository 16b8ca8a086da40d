//! Axum route handlers for the CV scoring API.

use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::AppError;
use crate::extraction::{extract_text, read_upload};
use crate::models::cv::{round2, CvReport, ProcessingTimes};
use crate::scoring::report::aggregate;
use crate::scoring::segmentation::segment_cv;
use crate::state::AppState;

/// Seconds spent in segmentation and in scoring.
struct StageTimes {
    segmentation: f64,
    scoring: f64,
}

/// Segments `text` and scores the segments against the cached model.
async fn score_text(state: &AppState, text: &str) -> Result<(CvReport, StageTimes), AppError> {
    let started = Instant::now();
    let segmented = segment_cv(&state.llm, text).await?;
    let segmentation = started.elapsed().as_secs_f64();
    info!("CV segmentation completed in {segmentation:.2} seconds");

    let started = Instant::now();
    let model = state.models.get_or_load_async().await?;
    let report = aggregate(&segmented.segments, model.as_ref(), state.reviewer.as_ref()).await?;
    let scoring = started.elapsed().as_secs_f64();
    info!("CV scoring completed in {scoring:.2} seconds");

    Ok((
        report,
        StageTimes {
            segmentation,
            scoring,
        },
    ))
}

/// POST /api/v1/cv/score
pub async fn handle_score(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CvReport>, AppError> {
    let started = Instant::now();
    let upload = read_upload(multipart).await?;
    info!("Starting CV processing for {}", upload.filename);

    let extraction_started = Instant::now();
    let text = extract_text(upload.kind, upload.bytes).await?;
    let text_extraction = extraction_started.elapsed().as_secs_f64();
    info!("Text extraction completed in {text_extraction:.2} seconds");

    let (mut report, times) = score_text(&state, &text).await?;

    let total = started.elapsed().as_secs_f64();
    info!("Total processing time: {total:.2} seconds");
    report.processing_times = Some(ProcessingTimes {
        text_extraction: round2(text_extraction),
        segmentation: round2(times.segmentation),
        scoring: round2(times.scoring),
        total: round2(total),
    });

    Ok(Json(report))
}

/// POST /api/v1/cv/score-local
///
/// Scores an already structured CV sent as a JSON object. Its `id`, when
/// present, becomes the report's `cv_id`.
pub async fn handle_score_local(
    State(state): State<AppState>,
    Json(cv_data): Json<Value>,
) -> Result<Json<CvReport>, AppError> {
    let started = Instant::now();
    let Value::Object(fields) = &cv_data else {
        return Err(AppError::Validation(
            "Request body must be a JSON object".to_string(),
        ));
    };
    info!("Starting local CV processing...");

    let text = serde_json::to_string_pretty(&cv_data).map_err(|e| {
        error!("Error serializing local CV: {e}");
        AppError::Internal(e.into())
    })?;

    let (mut report, times) = score_text(&state, &text).await?;

    if let Some(id) = fields.get("id") {
        report.cv_id = match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }

    let total = started.elapsed().as_secs_f64();
    info!("Total processing time: {total:.2} seconds");
    report.processing_times = Some(ProcessingTimes {
        text_extraction: 0.0,
        segmentation: round2(times.segmentation),
        scoring: round2(times.scoring),
        total: round2(total),
    });

    Ok(Json(report))
}

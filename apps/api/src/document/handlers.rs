use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::document::parser::structure_cv;
use crate::errors::AppError;
use crate::extraction::{extract_text, read_upload};
use crate::models::document::StructuredCv;
use crate::state::AppState;

/// POST /api/v1/document/process
pub async fn handle_process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<StructuredCv>, AppError> {
    let started = Instant::now();
    let upload = read_upload(multipart).await?;
    info!("Starting document processing for {}", upload.filename);

    let text = extract_text(upload.kind, upload.bytes).await?;
    info!(
        "Text extraction completed in {:.2} seconds",
        started.elapsed().as_secs_f64()
    );

    let parse_started = Instant::now();
    let cv = structure_cv(&state.llm, &text).await?;
    info!(
        "Document parsing completed in {:.2} seconds",
        parse_started.elapsed().as_secs_f64()
    );
    info!(
        "Total processing time: {:.2} seconds",
        started.elapsed().as_secs_f64()
    );

    Ok(Json(cv))
}

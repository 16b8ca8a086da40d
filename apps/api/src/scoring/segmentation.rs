//! Splits raw CV text into the fixed section taxonomy via the LLM.

use tracing::{error, info};

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, VERBATIM_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::cv::{SegmentedCv, DEFAULT_CV_ID};
use crate::scoring::prompts::SEGMENTATION_PROMPT_TEMPLATE;
use crate::scoring::sections::Section;

pub fn build_segmentation_prompt(raw_text: &str) -> String {
    let section_lines = Section::ALL
        .iter()
        .map(|s| format!(r#"    {{"section": "{}", "text": "..."}}"#, s.label()))
        .collect::<Vec<_>>()
        .join(",\n");

    // raw text goes in last so braces inside the CV are never treated as placeholders
    SEGMENTATION_PROMPT_TEMPLATE
        .replace("{default_cv_id}", DEFAULT_CV_ID)
        .replace("{section_lines}", &section_lines)
        .replace("{verbatim_instruction}", VERBATIM_INSTRUCTION)
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{raw_text}", raw_text)
}

/// Segments `raw_text`. Any gateway or JSON failure aborts the request.
pub async fn segment_cv(llm: &LlmClient, raw_text: &str) -> Result<SegmentedCv, AppError> {
    let prompt = build_segmentation_prompt(raw_text);
    let segmented: SegmentedCv = llm.call_json(&prompt).await.map_err(|e| {
        error!("Error segmenting CV: {e}");
        AppError::Llm(format!("Failed to segment CV: {e}"))
    })?;

    info!("CV segmented into {} sections", segmented.segments.len());
    Ok(segmented)
}

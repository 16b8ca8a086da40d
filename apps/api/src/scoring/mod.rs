// CV scoring pipeline
// extraction -> segmentation -> per-section model score + LLM review -> report.
// Segmentation and review go through llm_client; the content model is local.

pub mod cache;
pub mod encoder;
pub mod handlers;
pub mod model;
pub mod prompts;
pub mod report;
pub mod review;
pub mod section_scorer;
pub mod sections;
pub mod segmentation;
pub mod tfidf;
pub mod trees;

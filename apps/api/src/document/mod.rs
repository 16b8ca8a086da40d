// Document structuring: uploaded CV -> StructuredCv.
// Extraction is shared with scoring; the LLM call goes through llm_client.

pub mod handlers;
pub mod normalize;
pub mod parser;
pub mod prompts;

// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to every prompt whose answer is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT include explanations or apologies.";

/// Appended to prompts that must keep the candidate's wording intact.
pub const VERBATIM_INSTRUCTION: &str = "\
    Keep the original text exactly as it appears. \
    Do not translate, rephrase, add or infer any information.";

// Scoring pipeline LLM prompt templates.
// Placeholders are substituted with `str::replace` before the call.

pub const SEGMENTATION_PROMPT_TEMPLATE: &str = r#"You are an expert in resume analysis. Parse the following raw CV text and segment it into predefined sections without modifying, translating, or adding any content. Assign each piece of text to the appropriate section based on its content.

Return a JSON object with this structure:
{
  "cv_id": "{default_cv_id}",
  "segments": [
{section_lines}
  ]
}

Ensure the text in each section is exactly as it appears in the raw text, with no changes, translations, or additions.
If a section is missing, include it with an empty "text".
If a piece of text does not clearly belong to any section, assign it to the most relevant section based on context.

{verbatim_instruction}
{json_instruction}

Raw CV text:
{raw_text}"#;

pub const GRAMMAR_PROMPT_TEMPLATE: &str = r#"You are a professional proofreader. Analyze the following text and identify any grammar, syntax, or word usage errors. For each error, provide:
- Location (line or segment).
- Error type (grammar, syntax, vocabulary).
- Description of the error.
- Suggested correction.

Return the results as a list of errors in JSON format:
[
  {"location": "...", "type": "...", "description": "...", "suggestion": "..."}
]
Return [] when the text has no errors. Ensure the analysis is in English.

{json_instruction}

Text:
{text}"#;

pub const SUGGESTIONS_PROMPT_TEMPLATE: &str = r#"You are a career consultant. Analyze the content of a CV section (section: {section}) and provide specific suggestions to improve its quality. Focus on:
- Clarity and professionalism in expression.
- Adding critical details (if missing).
- Structuring content to stand out.

Provide up to 3 suggestions, each with:
- Issue description.
- Suggested improvement.

Return the results as a list in JSON format:
[
  {"issue": "...", "suggestion": "..."}
]
Ensure all suggestions are in English.

{json_instruction}

Content:
{text}"#;

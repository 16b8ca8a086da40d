// Structured CV extraction prompt.
// Keys here must match the field names read back in `document::parser`.

pub const STRUCTURE_PROMPT_TEMPLATE: &str = r#"You are an expert in resume analysis. Your task is to extract information from the raw CV text below and structure it according to the specified format. IMPORTANT: Only extract information that exists in the raw text. Do not add, modify, or infer any information.

Return a JSON object with this structure:
{
  "summary": "professional summary or objective, otherwise null",
  "personal_details": {
    "full_name": "full name, otherwise null",
    "phone_number": "phone number, otherwise null",
    "address": "address, otherwise null",
    "email": "email, otherwise null"
  },
  "socials": [
    {"icon": "platform name, otherwise null", "link": "profile URL, otherwise null"}
  ],
  "education": [
    {"degree": "...", "school": "...", "start_date": "...", "end_date": "...", "school_link": "...", "city": "...", "gpa": "...", "description": "..."}
  ],
  "languages": [
    {"language": "...", "proficiency": "..."}
  ],
  "skills": [
    {"skill_category": "...", "list_of_skill": "..."}
  ],
  "works": [
    {"company_name": "...", "position": "...", "location": "...", "start_date": "...", "end_date": "...", "description": "..."}
  ],
  "projects": [
    {"name": "...", "link": "...", "start_date": "...", "end_date": "...", "description": "..."}
  ],
  "certification": [
    {"certification_name": "...", "issuing_organization": "...", "issued_date": "...", "certification_link": "...", "credential_id": "..."}
  ],
  "organization": [
    {"name": "...", "position": "...", "address": "...", "start_date": "...", "end_date": "...", "description": "..."}
  ],
  "award": [
    {"award_title": "...", "award_title_link": "...", "issued_by": "...", "issued_date": "...", "description": "..."}
  ]
}

Rules:
1. ONLY extract information that exists in the raw text
2. DO NOT add, modify, or infer any information
3. If a field is not found in the raw text, use null
4. If a section is not found in the raw text, use an empty array []
5. Keep the original text format and content exactly as it appears, including line breaks and bullet points
6. Do not translate or modify any text
7. Copy dates exactly as written; write "Present" for an end date that is still ongoing

{json_instruction}

Raw CV text:
{raw_text}"#;

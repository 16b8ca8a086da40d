//! Structured CV extraction: one LLM call, then field-by-field normalization
//! of the raw JSON into a `StructuredCv`.

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::document::normalize::{convert_to_html, parse_gpa, social_icon, DateNormalizer};
use crate::document::prompts::STRUCTURE_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::document::{
    Award, Certification, Education, Language, Organization, PersonalDetails, Project, Skill,
    Social, StructuredCv, Work,
};

pub const UNSPECIFIED_PROFICIENCY: &str = "Not specified";

/// Extracts and normalizes a structured CV from raw document text.
pub async fn structure_cv(llm: &LlmClient, raw_text: &str) -> Result<StructuredCv, AppError> {
    let prompt = STRUCTURE_PROMPT_TEMPLATE
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{raw_text}", raw_text);

    let raw: Value = llm.call_json(&prompt).await.map_err(|e| {
        error!("Error parsing CV with LLM: {e}");
        AppError::Llm(format!("Failed to parse CV: {e}"))
    })?;
    if !raw.is_object() {
        error!("CV extraction returned a non-object JSON value");
        return Err(AppError::Llm(
            "Failed to parse CV: expected a JSON object".to_string(),
        ));
    }

    let cv = normalize_cv(&raw, chrono::Local::now().naive_local());
    info!(
        "Structured CV: {} works, {} education, {} projects, {} date fallbacks",
        cv.works.len(),
        cv.education.len(),
        cv.projects.len(),
        cv.date_fallbacks.len()
    );
    Ok(cv)
}

/// Builds a `StructuredCv` from the extraction JSON. Never fails: malformed
/// entries are dropped or left empty, unparseable dates become `now`.
pub fn normalize_cv(raw: &Value, now: NaiveDateTime) -> StructuredCv {
    let mut dates = DateNormalizer::new(now);

    let personal_details = raw
        .get("personal_details")
        .map(|p| PersonalDetails {
            full_name: text(p, "full_name"),
            phone_number: text(p, "phone_number"),
            address: text(p, "address"),
            email: text(p, "email"),
        })
        .unwrap_or_default();

    let socials = objects(raw, "socials")
        .filter_map(|(_, item)| {
            let Some(link) = text(item, "link").or_else(|| text(item, "icon")) else {
                warn!("No link found in social item");
                return None;
            };
            Some(Social {
                icon: social_icon(&link).map(str::to_string),
                link: Some(link),
            })
        })
        .collect();

    let education = objects(raw, "education")
        .map(|(i, item)| {
            let path = format!("education[{i}]");
            Education {
                degree: text(item, "degree"),
                school: text(item, "school"),
                start_date: dates.date(&format!("{path}.start_date"), text(item, "start_date").as_deref()),
                end_date: dates
                    .end_date(&format!("{path}.end_date"), text(item, "end_date").as_deref())
                    .0,
                school_link: text(item, "school_link"),
                city: text(item, "city"),
                gpa: gpa(item.get("gpa")),
                description: html(item, "description"),
            }
        })
        .collect();

    let languages = objects(raw, "languages")
        .filter_map(|(_, item)| {
            Some(Language {
                language: Some(text(item, "language")?),
                proficiency: Some(
                    text(item, "proficiency").unwrap_or_else(|| UNSPECIFIED_PROFICIENCY.to_string()),
                ),
            })
        })
        .collect();

    let skills = objects(raw, "skills")
        .map(|(_, item)| Skill {
            skill_category: text(item, "skill_category"),
            list_of_skill: text(item, "list_of_skill"),
        })
        .collect();

    let works = objects(raw, "works")
        .map(|(i, item)| {
            let path = format!("works[{i}]");
            let start_date = dates.date(&format!("{path}.start_date"), text(item, "start_date").as_deref());
            let (end_date, is_current_working) =
                dates.end_date(&format!("{path}.end_date"), text(item, "end_date").as_deref());
            Work {
                company_name: text(item, "company_name"),
                is_current_working,
                position: text(item, "position"),
                location: text(item, "location"),
                start_date,
                end_date,
                description: html(item, "description"),
            }
        })
        .collect();

    let projects = objects(raw, "projects")
        .map(|(i, item)| {
            let path = format!("projects[{i}]");
            let start_date = dates.date(&format!("{path}.start_date"), text(item, "start_date").as_deref());
            let (end_date, is_ongoing) =
                dates.end_date(&format!("{path}.end_date"), text(item, "end_date").as_deref());
            Project {
                name: text(item, "name"),
                link: text(item, "link"),
                start_date,
                end_date,
                is_ongoing,
                description: html(item, "description"),
            }
        })
        .collect();

    let certification = objects(raw, "certification")
        .map(|(i, item)| Certification {
            certification_name: text(item, "certification_name"),
            issuing_organization: text(item, "issuing_organization"),
            issued_date: dates.date(
                &format!("certification[{i}].issued_date"),
                text(item, "issued_date").as_deref(),
            ),
            certification_link: text(item, "certification_link"),
            credential_id: text(item, "credential_id"),
        })
        .collect();

    let organization = objects(raw, "organization")
        .map(|(i, item)| {
            let path = format!("organization[{i}]");
            Organization {
                name: text(item, "name"),
                position: text(item, "position"),
                address: text(item, "address"),
                start_date: dates.date(&format!("{path}.start_date"), text(item, "start_date").as_deref()),
                end_date: dates
                    .end_date(&format!("{path}.end_date"), text(item, "end_date").as_deref())
                    .0,
                description: html(item, "description"),
            }
        })
        .collect();

    let award = objects(raw, "award")
        .map(|(i, item)| Award {
            award_title: text(item, "award_title"),
            award_title_link: text(item, "award_title_link"),
            issued_by: text(item, "issued_by"),
            issued_date: dates.date(
                &format!("award[{i}].issued_date"),
                text(item, "issued_date").as_deref(),
            ),
            description: html(item, "description"),
        })
        .collect();

    StructuredCv {
        summary: html(raw, "summary"),
        personal_details,
        socials,
        education,
        languages,
        skills,
        works,
        projects,
        certification,
        organization,
        award,
        date_fallbacks: dates.into_fallbacks(),
    }
}

/// Object entries of the array at `key`, with their original index.
fn objects<'a>(raw: &'a Value, key: &str) -> impl Iterator<Item = (usize, &'a Value)> {
    raw.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
        .filter(|(_, item)| item.is_object())
}

/// A non-blank scalar field as text.
fn text(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn html(item: &Value, key: &str) -> Option<String> {
    text(item, key).map(|t| convert_to_html(&t))
}

fn gpa(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_gpa(s),
        _ => None,
    }
}

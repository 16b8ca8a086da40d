use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    /// `None` when the link's domain is not a known platform.
    pub icon: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: Option<String>,
    pub school: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub school_link: Option<String>,
    pub city: Option<String>,
    pub gpa: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub language: Option<String>,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub skill_category: Option<String>,
    pub list_of_skill: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub company_name: Option<String>,
    pub is_current_working: bool,
    pub position: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: Option<String>,
    pub link: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub is_ongoing: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub certification_name: Option<String>,
    pub issuing_organization: Option<String>,
    pub issued_date: Option<NaiveDateTime>,
    pub certification_link: Option<String>,
    pub credential_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub name: Option<String>,
    pub position: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub award_title: Option<String>,
    pub award_title_link: Option<String>,
    pub issued_by: Option<String>,
    pub issued_date: Option<NaiveDateTime>,
    pub description: Option<String>,
}

/// A fully parsed CV: dates normalized, free text rendered as simple HTML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredCv {
    pub summary: Option<String>,
    pub personal_details: PersonalDetails,
    pub socials: Vec<Social>,
    pub education: Vec<Education>,
    pub languages: Vec<Language>,
    pub skills: Vec<Skill>,
    pub works: Vec<Work>,
    pub projects: Vec<Project>,
    pub certification: Vec<Certification>,
    pub organization: Vec<Organization>,
    pub award: Vec<Award>,
    /// Field paths whose date could not be parsed and were set to the current time.
    pub date_fallbacks: Vec<String>,
}

//! The closed CV section taxonomy and its point budgets.

use std::fmt;

/// A recognized CV section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    PersonalInfo,
    Summary,
    Skills,
    WorkExperience,
    Education,
    Projects,
    Certifications,
    Languages,
    OrganizationalVolunteering,
    Awards,
    HobbiesInterests,
}

impl Section {
    /// Taxonomy order, as requested from the segmentation prompt.
    pub const ALL: [Section; 11] = [
        Section::PersonalInfo,
        Section::Summary,
        Section::Skills,
        Section::WorkExperience,
        Section::Education,
        Section::Projects,
        Section::Certifications,
        Section::Languages,
        Section::OrganizationalVolunteering,
        Section::Awards,
        Section::HobbiesInterests,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::PersonalInfo => "Personal Info",
            Section::Summary => "Summary",
            Section::Skills => "Skills",
            Section::WorkExperience => "Work Experience",
            Section::Education => "Education",
            Section::Projects => "Projects",
            Section::Certifications => "Certifications",
            Section::Languages => "Languages",
            Section::OrganizationalVolunteering => "Organizational & Volunteering",
            Section::Awards => "Awards",
            Section::HobbiesInterests => "Hobbies & Interests",
        }
    }

    /// Exact-label lookup. Anything else is not a scorable section.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Point budget of the section. Hobbies & Interests is informational only.
    pub fn max_score(self) -> u32 {
        match self {
            Section::PersonalInfo => 10,
            Section::Summary => 10,
            Section::Skills => 15,
            Section::WorkExperience => 20,
            Section::Education => 10,
            Section::Projects => 15,
            Section::Certifications => 5,
            Section::Languages => 5,
            Section::OrganizationalVolunteering => 5,
            Section::Awards => 5,
            Section::HobbiesInterests => 0,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sum of all positive section budgets; the denominator of the 100-point scale.
pub fn total_max_score() -> u32 {
    Section::ALL
        .iter()
        .map(|s| s.max_score())
        .filter(|&m| m > 0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_max_score_is_100() {
        assert_eq!(total_max_score(), 100);
    }

    #[test]
    fn test_label_roundtrip_for_every_section() {
        for section in Section::ALL {
            assert_eq!(Section::from_label(section.label()), Some(section));
        }
    }

    #[test]
    fn test_unknown_or_miscased_labels_rejected() {
        assert_eq!(Section::from_label("References"), None);
        assert_eq!(Section::from_label("work experience"), None);
        assert_eq!(Section::from_label(""), None);
    }

    #[test]
    fn test_hobbies_has_zero_budget() {
        assert_eq!(Section::HobbiesInterests.max_score(), 0);
        assert_eq!(Section::WorkExperience.max_score(), 20);
    }
}

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier reported when neither the segments nor the request carry one.
pub const DEFAULT_CV_ID: &str = "CV154-Cloud_Specialist";

/// A (section name, raw text) pair produced by segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub section: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_id: Option<String>,
}

impl Segment {
    pub fn new(section: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            text: text.into(),
            cv_id: None,
        }
    }
}

/// Segmentation output: an identifier plus one segment per taxonomy section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentedCv {
    #[serde(default)]
    pub cv_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub segments: Vec<Segment>,
}

/// A single grammar, vocabulary or syntax issue reported for a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrammarError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub error_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestion: String,
}

/// An improvement suggestion for a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarCounts {
    pub minor: u32,
    pub severe: u32,
}

impl GrammarCounts {
    pub fn total(&self) -> u32 {
        self.minor + self.severe
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Good,
    Weak,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReport {
    pub section: String,
    pub content_score: f64,
    pub final_score: f64,
    pub grammar_errors: GrammarCounts,
    pub grammar_errors_detailed: Vec<GrammarError>,
    pub suggestions: Vec<Suggestion>,
    pub quality: Quality,
}

impl SectionReport {
    /// Report for a section that was not scored at all.
    pub fn missing(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            content_score: 0.0,
            final_score: 0.0,
            grammar_errors: GrammarCounts::default(),
            grammar_errors_detailed: vec![],
            suggestions: vec![],
            quality: Quality::Missing,
        }
    }
}

/// Stage timings in seconds, rounded to 2 decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingTimes {
    pub text_extraction: f64,
    pub segmentation: f64,
    pub scoring: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvReport {
    pub cv_id: String,
    pub sections: Vec<SectionReport>,
    pub total_content_score: f64,
    pub total_final_score: f64,
    pub content_score_100: f64,
    pub final_score_100: f64,
    pub total_grammar_errors: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_times: Option<ProcessingTimes>,
}

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Treats an explicit JSON `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_null_text_becomes_empty() {
        let seg: Segment = serde_json::from_str(r#"{"section": "Awards", "text": null}"#).unwrap();
        assert_eq!(seg.text, "");
        assert!(seg.cv_id.is_none());
    }

    #[test]
    fn test_grammar_error_type_field_rename() {
        let err: GrammarError = serde_json::from_str(
            r#"{"location": "line 1", "type": "Syntax", "description": "d", "suggestion": "s"}"#,
        )
        .unwrap();
        assert_eq!(err.error_type, "Syntax");
        let back = serde_json::to_value(&err).unwrap();
        assert_eq!(back["type"], "Syntax");
    }

    #[test]
    fn test_quality_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Quality::Weak).unwrap(), "\"Weak\"");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(9.099999), 9.1);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_processing_times_omitted_when_absent() {
        let report = CvReport {
            cv_id: DEFAULT_CV_ID.to_string(),
            sections: vec![],
            total_content_score: 0.0,
            total_final_score: 0.0,
            content_score_100: 0.0,
            final_score_100: 0.0,
            total_grammar_errors: 0,
            processing_times: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("processing_times").is_none());
    }
}

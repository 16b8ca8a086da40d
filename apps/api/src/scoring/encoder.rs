//! One-hot encoder for the section name feature.

use serde::Deserialize;

use super::model::ModelError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategory {
    /// Unknown categories encode as all zeros.
    #[default]
    Ignore,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionEncoder {
    categories: Vec<String>,
    #[serde(default)]
    handle_unknown: UnknownCategory,
}

impl SectionEncoder {
    pub fn n_features(&self) -> usize {
        self.categories.len()
    }

    pub fn transform(&self, category: &str) -> Result<Vec<f32>, ModelError> {
        let mut row = vec![0.0_f32; self.categories.len()];
        match self.categories.iter().position(|c| c == category) {
            Some(i) => row[i] = 1.0,
            None if self.handle_unknown == UnknownCategory::Error => {
                return Err(ModelError::UnknownCategory(category.to_string()))
            }
            None => {}
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_one_hot_position() {
        let enc: SectionEncoder =
            serde_json::from_value(json!({"categories": ["Awards", "Skills", "Summary"]})).unwrap();
        assert_eq!(enc.transform("Skills").unwrap(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unknown_ignored_by_default() {
        let enc: SectionEncoder =
            serde_json::from_value(json!({"categories": ["Awards"]})).unwrap();
        assert_eq!(enc.transform("Hobbies & Interests").unwrap(), vec![0.0]);
    }

    #[test]
    fn test_unknown_rejected_when_configured() {
        let enc: SectionEncoder = serde_json::from_value(
            json!({"categories": ["Awards"], "handle_unknown": "error"}),
        )
        .unwrap();
        assert!(matches!(
            enc.transform("Skills"),
            Err(ModelError::UnknownCategory(_))
        ));
    }
}

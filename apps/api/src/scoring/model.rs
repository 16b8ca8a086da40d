//! Section content model: TF-IDF text features + one-hot section features fed
//! to a gradient-boosted regressor whose output is clamped to [0, 1].

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::encoder::SectionEncoder;
use super::sections::Section;
use super::tfidf::TfidfVectorizer;
use super::trees::TreeEnsemble;

pub const REGRESSOR_FILE: &str = "scoring_model.json";
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
pub const SECTION_ENCODER_FILE: &str = "section_encoder.json";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Missing model files: {}", .0.join(", "))]
    MissingFiles(Vec<String>),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    #[error("Unknown section category: {0}")]
    UnknownCategory(String),
}

/// Locations of the three persisted artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub regressor: PathBuf,
    pub vectorizer: PathBuf,
    pub section_encoder: PathBuf,
}

impl ModelPaths {
    /// Default file names inside one directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            regressor: dir.join(REGRESSOR_FILE),
            vectorizer: dir.join(VECTORIZER_FILE),
            section_encoder: dir.join(SECTION_ENCODER_FILE),
        }
    }

    /// "name (path)" for every artifact that does not exist on disk.
    pub fn missing(&self) -> Vec<String> {
        [
            ("regressor", &self.regressor),
            ("vectorizer", &self.vectorizer),
            ("section_encoder", &self.section_encoder),
        ]
        .into_iter()
        .filter(|(_, path)| !path.exists())
        .map(|(name, path)| format!("{name} ({})", path.display()))
        .collect()
    }
}

/// Maps a recognized section and its text to a normalized quality score.
pub trait ContentScorer: Send + Sync {
    fn normalized_score(&self, section: Section, text: &str) -> Result<f64, ModelError>;
}

/// The loaded regressor, vectorizer and section encoder.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    regressor: TreeEnsemble,
    vectorizer: TfidfVectorizer,
    encoder: SectionEncoder,
}

impl ModelArtifacts {
    /// Reads all three artifacts. Fails with `MissingFiles` before reading
    /// anything when one of them is absent.
    pub fn load(paths: &ModelPaths) -> Result<Self, ModelError> {
        let missing = paths.missing();
        if !missing.is_empty() {
            return Err(ModelError::MissingFiles(missing));
        }

        let regressor = read_artifact(&paths.regressor, TreeEnsemble::from_json)?;
        let vectorizer = read_artifact(&paths.vectorizer, |s| serde_json::from_str(s))?;
        let encoder = read_artifact(&paths.section_encoder, |s| serde_json::from_str(s))?;

        Self::from_parts(regressor, vectorizer, encoder)
    }

    pub fn from_parts(
        regressor: TreeEnsemble,
        vectorizer: TfidfVectorizer,
        encoder: SectionEncoder,
    ) -> Result<Self, ModelError> {
        vectorizer.validate()?;
        let width = vectorizer.n_features() + encoder.n_features();
        if let Some(expected) = regressor.num_features() {
            if expected != width {
                return Err(ModelError::Invalid(format!(
                    "regressor expects {expected} features but vectorizer and encoder produce {width}"
                )));
            }
        }
        Ok(Self {
            regressor,
            vectorizer,
            encoder,
        })
    }

    /// Text features followed by section features.
    fn features(&self, section: Section, text: &str) -> Result<Vec<f32>, ModelError> {
        let mut row = self.vectorizer.transform(text);
        row.extend(self.encoder.transform(section.label())?);
        Ok(row)
    }
}

impl ContentScorer for ModelArtifacts {
    fn normalized_score(&self, section: Section, text: &str) -> Result<f64, ModelError> {
        let features = self.features(section, text)?;
        Ok(self.regressor.predict(&features).clamp(0.0, 1.0))
    }
}

fn read_artifact<T>(
    path: &Path,
    parse: impl FnOnce(&str) -> Result<T, serde_json::Error>,
) -> Result<T, ModelError> {
    let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&raw).map_err(|source| ModelError::Parse {
        path: path.display().to_string(),
        source,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::write_artifacts;
    use super::*;

    #[test]
    fn test_missing_files_listed_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifacts::load(&ModelPaths::in_dir(dir.path())).unwrap_err();
        match err {
            ModelError::MissingFiles(files) => {
                assert_eq!(files.len(), 3);
                assert!(files[0].starts_with("regressor ("));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scores_follow_text_features() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelArtifacts::load(&write_artifacts(dir.path())).unwrap();

        let with_rust = model
            .normalized_score(Section::Skills, "Rust, Tokio, Axum")
            .unwrap();
        let without = model.normalized_score(Section::Skills, "Excel").unwrap();
        assert!((with_rust - 0.8).abs() < 1e-6, "score was {with_rust}");
        assert!((without - 0.3).abs() < 1e-6, "score was {without}");
    }

    #[test]
    fn test_score_clamped_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelArtifacts::load(&write_artifacts(dir.path())).unwrap();
        let score = model.normalized_score(Section::Awards, "rust award").unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_feature_width_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        fs::write(&paths.section_encoder, r#"{"categories": ["Skills"]}"#).unwrap();
        assert!(matches!(
            ModelArtifacts::load(&paths),
            Err(ModelError::Invalid(_))
        ));
    }

    #[test]
    fn test_corrupt_artifact_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        fs::write(&paths.vectorizer, "{not json").unwrap();
        assert!(matches!(
            ModelArtifacts::load(&paths),
            Err(ModelError::Parse { .. })
        ));
    }
}

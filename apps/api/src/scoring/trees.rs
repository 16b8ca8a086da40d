//! Gradient-boosted regression trees loaded from XGBoost's JSON model format.
//!
//! Only the parts needed for inference are read: the global base score and,
//! per tree, the parallel node arrays. A node is a leaf when its left child
//! is -1; a leaf's value is stored in `split_conditions`.

use serde::Deserialize;

use super::model::ModelError;

#[derive(Debug, Deserialize)]
struct XgbModelFile {
    learner: Learner,
}

#[derive(Debug, Deserialize)]
struct Learner {
    learner_model_param: LearnerModelParam,
    gradient_booster: GradientBooster,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GradientBooster {
    model: BoosterModel,
}

#[derive(Debug, Deserialize)]
struct BoosterModel {
    trees: Vec<RawTree>,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
}

/// Older exports write booleans, newer ones write 0/1.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f32),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_raw(index: usize, raw: RawTree) -> Result<Self, ModelError> {
        let n = raw.left_children.len();
        let lengths = [
            raw.right_children.len(),
            raw.split_indices.len(),
            raw.split_conditions.len(),
            raw.default_left.len(),
        ];
        if n == 0 || lengths.iter().any(|&len| len != n) {
            return Err(ModelError::Invalid(format!(
                "tree {index} has inconsistent node arrays"
            )));
        }

        let child = |value: i32| -> Result<usize, ModelError> {
            usize::try_from(value)
                .ok()
                .filter(|&c| c < n)
                .ok_or_else(|| ModelError::Invalid(format!("tree {index} has child index {value}")))
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let node = if raw.left_children[i] == -1 {
                Node::Leaf(raw.split_conditions[i])
            } else {
                Node::Split {
                    feature: raw.split_indices[i] as usize,
                    threshold: raw.split_conditions[i],
                    left: child(raw.left_children[i])?,
                    right: child(raw.right_children[i])?,
                    default_left: raw.default_left[i].is_set(),
                }
            };
            nodes.push(node);
        }
        Ok(Self { nodes })
    }

    fn leaf_value(&self, features: &[f32]) -> f32 {
        let mut index = 0;
        // a well-formed tree reaches a leaf in at most `nodes.len()` steps
        for _ in 0..=self.nodes.len() {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    index = match features.get(feature) {
                        Some(x) if !x.is_nan() => {
                            if *x < threshold {
                                left
                            } else {
                                right
                            }
                        }
                        _ if default_left => left,
                        _ => right,
                    };
                }
            }
        }
        0.0
    }
}

/// Sum-of-trees regressor.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    base_score: f32,
    num_features: Option<usize>,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: XgbModelFile = serde_json::from_str(json)?;
        Self::from_model_file(file).map_err(serde::de::Error::custom)
    }

    fn from_model_file(file: XgbModelFile) -> Result<Self, ModelError> {
        let params = file.learner.learner_model_param;
        let base_score = parse_xgb_float(&params.base_score).ok_or_else(|| {
            ModelError::Invalid(format!("unreadable base_score '{}'", params.base_score))
        })?;
        let num_features = params
            .num_feature
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);

        let trees = file
            .learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, raw)| Tree::from_raw(i, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_score,
            num_features,
            trees,
        })
    }

    /// Feature count declared by the model, if any.
    pub fn num_features(&self) -> Option<usize> {
        self.num_features
    }

    pub fn predict(&self, features: &[f32]) -> f64 {
        let margin: f32 = self.base_score + self.trees.iter().map(|t| t.leaf_value(features)).sum::<f32>();
        margin as f64
    }
}

/// XGBoost stores floats as strings, sometimes wrapped in brackets ("[5E-1]").
fn parse_xgb_float(raw: &str) -> Option<f32> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .parse()
        .ok()
}

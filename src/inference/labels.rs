use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::inference::ModelError;

#[derive(Deserialize)]
struct LabelArtifact {
    version: String,
    labels: Vec<String>,
}

/// Fixed, versioned list of category labels. Model outputs are indices into
/// this list.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelVocabulary {
    version: String,
    labels: Vec<String>,
}

impl LabelVocabulary {
    pub fn new(version: impl Into<String>, labels: Vec<String>) -> Result<Self, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::Artifact("label list is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if label.trim().is_empty() {
                return Err(ModelError::Artifact("blank label".to_string()));
            }
            if !seen.insert(label.as_str()) {
                return Err(ModelError::Artifact(format!("duplicate label {label:?}")));
            }
        }

        Ok(Self {
            version: version.into(),
            labels,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: LabelArtifact =
            serde_json::from_str(json).map_err(|error| ModelError::Artifact(error.to_string()))?;
        Self::new(artifact.version, artifact.labels)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path).map_err(|error| {
            ModelError::Artifact(format!("cannot read {}: {error}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Map a model output index back to its label.
    pub fn decode(&self, index: u64) -> Result<&str, ModelError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
            .ok_or(ModelError::UnknownLabel(index))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

//! Model boundary: the classifier and scorer capabilities used by the
//! categorization and matching stages.

use std::path::Path;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use thiserror::Error;

use crate::domain::matching::ScoreDecision;
use crate::inference::classifier::EmbeddingClassifier;
use crate::inference::labels::LabelVocabulary;
use crate::inference::scorer::EmbeddingScorer;
use crate::models::config::PipelineConfig;

pub mod classifier;
pub mod embedding;
pub mod labels;
pub mod scorer;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model: {0}")]
    Load(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("label artifact is invalid: {0}")]
    Artifact(String),
    #[error("label index {0} is outside the vocabulary")]
    UnknownLabel(u64),
    #[error("model returned {actual} outputs for {expected} inputs")]
    OutputMismatch { expected: usize, actual: usize },
}

/// Text → category label.
pub trait Classifier: Send + Sync {
    /// Classify every text, returning one label per input in input order.
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<String>, ModelError>;
}

/// (user text, job text) → match decision.
pub trait Scorer: Send + Sync {
    /// Called once per matching run with the whole job corpus so that
    /// implementations can precompute per-posting state.
    fn prime(&self, _job_texts: &[String]) -> Result<(), ModelError> {
        Ok(())
    }

    fn score(&self, user_text: &str, job_text: &str) -> Result<ScoreDecision, ModelError>;
}

/// Long-lived model handles, loaded once at startup and shared read-only by
/// every stage invocation.
#[derive(Clone)]
pub struct ModelHandles {
    pub classifier: Arc<dyn Classifier>,
    pub scorer: Arc<dyn Scorer>,
}

impl ModelHandles {
    pub fn new(classifier: Arc<dyn Classifier>, scorer: Arc<dyn Scorer>) -> Self {
        Self { classifier, scorer }
    }

    /// Load the label vocabulary and the embedding model.
    pub fn load(config: &PipelineConfig) -> Result<Self, ModelError> {
        let vocabulary = LabelVocabulary::load(Path::new(&config.labels_path))?;
        log::info!(
            "Loaded label vocabulary {} with {} labels",
            vocabulary.version(),
            vocabulary.len()
        );

        let embedder =
            TextEmbedding::try_new(InitOptions::new(EmbeddingModel::MultilingualE5Large))
                .map_err(|error| ModelError::Load(format!("{error:?}")))?;
        let embedder = Arc::new(Mutex::new(embedder));

        let classifier = EmbeddingClassifier::new(Arc::clone(&embedder), vocabulary)?;
        let scorer = EmbeddingScorer::new(embedder, config.match_threshold);

        Ok(Self::new(Arc::new(classifier), Arc::new(scorer)))
    }
}

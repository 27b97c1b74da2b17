use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::domain::matching::ScoreDecision;
use crate::inference::embedding::{
    SharedEmbedder, TextEmbedder, cosine_similarity, embed_normalized,
};
use crate::inference::{ModelError, Scorer};

/// Scores a pair by the cosine similarity of the two texts' embeddings; the
/// pair matches when the similarity reaches `threshold`.
///
/// Embeddings are cached by text, so after [`Scorer::prime`] every posting
/// is embedded exactly once per run and each user text once.
pub struct EmbeddingScorer<E> {
    embedder: SharedEmbedder<E>,
    threshold: f32,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl<E: TextEmbedder> EmbeddingScorer<E> {
    pub fn new(embedder: SharedEmbedder<E>, threshold: f32) -> Self {
        Self {
            embedder,
            threshold,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<f32>>>, ModelError> {
        self.cache
            .lock()
            .map_err(|_| ModelError::Inference("embedding cache lock poisoned".to_string()))
    }

    fn embedding_for(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        if let Some(cached) = self.cache()?.get(text) {
            return Ok(cached.clone());
        }

        let embedding = embed_normalized(&self.embedder, vec![text.to_string()])?
            .into_iter()
            .next()
            .unwrap_or_default();
        self.cache()?.insert(text.to_string(), embedding.clone());

        Ok(embedding)
    }
}

impl<E: TextEmbedder> Scorer for EmbeddingScorer<E> {
    fn prime(&self, job_texts: &[String]) -> Result<(), ModelError> {
        let missing = {
            let cache = self.cache()?;
            let mut seen = HashSet::new();
            job_texts
                .iter()
                .filter(|text| !cache.contains_key(text.as_str()) && seen.insert(text.as_str()))
                .cloned()
                .collect::<Vec<_>>()
        };

        if missing.is_empty() {
            return Ok(());
        }

        log::info!("Embedding {} job texts", missing.len());
        let embeddings = embed_normalized(&self.embedder, missing.clone())?;

        self.cache()?.extend(missing.into_iter().zip(embeddings));
        Ok(())
    }

    fn score(&self, user_text: &str, job_text: &str) -> Result<ScoreDecision, ModelError> {
        let user = self.embedding_for(user_text)?;
        let job = self.embedding_for(job_text)?;
        let similarity = cosine_similarity(&user, &job);

        Ok(ScoreDecision {
            matched: similarity >= self.threshold,
            score: Some(similarity),
        })
    }
}

use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard};

use fastembed::TextEmbedding;
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::inference::ModelError;

/// Anything that turns texts into dense vectors.
pub trait TextEmbedder: Send {
    fn embed_texts(&mut self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, ModelError>;
}

impl TextEmbedder for TextEmbedding {
    fn embed_texts(&mut self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, ModelError> {
        self.embed(texts, None)
            .map_err(|error| ModelError::Inference(format!("Failed to generate embedding: {error:?}")))
    }
}

/// One embedder shared by the classifier and the scorer.
pub type SharedEmbedder<E> = Arc<Mutex<E>>;

pub(crate) fn lock_embedder<E>(embedder: &Mutex<E>) -> Result<MutexGuard<'_, E>, ModelError> {
    embedder
        .lock()
        .map_err(|_| ModelError::Inference("embedder lock poisoned".to_string()))
}

/// Embed `texts` and normalize every vector, checking that the model
/// answered once per input.
pub(crate) fn embed_normalized<E: TextEmbedder>(
    embedder: &Mutex<E>,
    texts: Vec<String>,
) -> Result<Vec<Vec<f32>>, ModelError> {
    let expected = texts.len();
    if expected == 0 {
        return Ok(Vec::new());
    }

    let embeddings = lock_embedder(embedder)?.embed_texts(texts)?;
    if embeddings.len() != expected {
        return Err(ModelError::OutputMismatch {
            expected,
            actual: embeddings.len(),
        });
    }

    Ok(embeddings
        .iter()
        .map(|value| normalize_embedding(value))
        .collect())
}

/// Normalize a vector to unit length.
///
/// Returns the original vector when the norm is zero.
pub(crate) fn normalize_embedding(vec: &[f32]) -> Vec<f32> {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        vec.to_vec()
    } else {
        vec.iter().map(|x| x / norm).collect()
    }
}

/// Cosine similarity of two unit vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Build a cosine index over `items`, keyed by their ids.
pub(crate) fn build_index<'a, T>(
    dimensions: usize,
    items: &'a [(i32, T)],
) -> Result<Index, Box<dyn Error>>
where
    T: AsRef<[f32]> + 'a,
{
    let index = Index::new(&IndexOptions {
        dimensions,
        metric: MetricKind::Cos,
        quantization: ScalarKind::F32,
        ..Default::default()
    })?;

    index.reserve(items.len())?;

    for (id, embedding) in items {
        index.add(*id as u64, embedding.as_ref())?;
    }

    Ok(index)
}

/// Search the top-k closest vectors to the query embedding.
pub(crate) fn search_top_k(
    index: &Index,
    query_embedding: &[f32],
    k: usize,
) -> Result<Vec<(u64, f32)>, Box<dyn Error>> {
    if index.size() == 0 || k == 0 {
        return Ok(Vec::new());
    }

    let neighbors = index.search(query_embedding, k)?;

    let results: Vec<(u64, f32)> = neighbors
        .keys
        .iter()
        .zip(neighbors.distances.iter())
        .map(|(&key, &distance)| (key, distance))
        .collect();

    Ok(results)
}

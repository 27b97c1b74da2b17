use usearch::Index;

use crate::inference::embedding::{
    SharedEmbedder, TextEmbedder, build_index, embed_normalized, search_top_k,
};
use crate::inference::labels::LabelVocabulary;
use crate::inference::{Classifier, ModelError};

/// Label prompt for label-directory embeddings: the label name only.
fn label_prompt(label: &str) -> String {
    label.to_string()
}

/// Zero-shot classifier: every text gets the label whose embedding is
/// nearest to its own.
pub struct EmbeddingClassifier<E> {
    embedder: SharedEmbedder<E>,
    vocabulary: LabelVocabulary,
    label_index: Index,
}

impl<E: TextEmbedder> EmbeddingClassifier<E> {
    /// Embed the whole vocabulary once and index it.
    pub fn new(embedder: SharedEmbedder<E>, vocabulary: LabelVocabulary) -> Result<Self, ModelError> {
        let prompts = vocabulary
            .labels()
            .iter()
            .map(|label| label_prompt(label))
            .collect::<Vec<_>>();
        let embeddings = embed_normalized(&embedder, prompts)?;

        let label_embeddings = embeddings
            .into_iter()
            .enumerate()
            .map(|(index, embedding)| {
                i32::try_from(index)
                    .map(|key| (key, embedding))
                    .map_err(|_| ModelError::Artifact("too many labels".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dimensions = label_embeddings
            .first()
            .map(|(_, embedding)| embedding.len())
            .unwrap_or_default();
        let label_index = build_index(dimensions, &label_embeddings)
            .map_err(|error| ModelError::Load(format!("label index: {error}")))?;

        Ok(Self {
            embedder,
            vocabulary,
            label_index,
        })
    }

    /// Index of the nearest label for every text.
    fn predict_indices(&self, texts: &[String]) -> Result<Vec<u64>, ModelError> {
        let embeddings = embed_normalized(&self.embedder, texts.to_vec())?;

        embeddings
            .iter()
            .map(|embedding| {
                let neighbors = search_top_k(&self.label_index, embedding, 1)
                    .map_err(|error| ModelError::Inference(format!("top-1 label search: {error}")))?;
                neighbors
                    .first()
                    .map(|(key, _)| *key)
                    .ok_or_else(|| ModelError::Inference("no label candidate".to_string()))
            })
            .collect()
    }
}

impl<E: TextEmbedder> Classifier for EmbeddingClassifier<E> {
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<String>, ModelError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.predict_indices(texts)?
            .into_iter()
            .map(|index| self.vocabulary.decode(index).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{EmbeddingClassifier, label_prompt};
    use crate::inference::embedding::TextEmbedder;
    use crate::inference::labels::LabelVocabulary;
    use crate::inference::{Classifier, ModelError};

    /// Embeds a text as counts of a few marker words.
    #[derive(Default)]
    struct KeywordEmbedder {
        embedded: usize,
    }

    impl TextEmbedder for KeywordEmbedder {
        fn embed_texts(&mut self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, ModelError> {
            self.embedded += texts.len();
            Ok(texts
                .iter()
                .map(|text| {
                    let text = text.to_lowercase();
                    ["account", "nurs", "software"]
                        .iter()
                        .map(|word| text.matches(word).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    impl TextEmbedder for FailingEmbedder {
        fn embed_texts(&mut self, _texts: Vec<String>) -> Result<Vec<Vec<f32>>, ModelError> {
            Err(ModelError::Inference("out of memory".to_string()))
        }
    }

    fn vocabulary() -> LabelVocabulary {
        LabelVocabulary::new(
            "test",
            vec![
                "Accounting".to_string(),
                "Nursing".to_string(),
                "Software".to_string(),
            ],
        )
        .expect("valid vocabulary")
    }

    #[test]
    fn label_prompt_uses_label_name_only() {
        assert_eq!(label_prompt("Health Care"), "Health Care");
    }

    #[test]
    fn classifies_each_text_to_nearest_label() {
        let classifier =
            EmbeddingClassifier::new(Arc::new(Mutex::new(KeywordEmbedder::default())), vocabulary())
                .expect("classifier loads");

        let labels = classifier
            .classify_batch(&[
                "senior software developer".to_string(),
                "registered nurse midwife".to_string(),
                "accountant account reconciliation".to_string(),
            ])
            .expect("classification succeeds");

        assert_eq!(labels, vec!["Software", "Nursing", "Accounting"]);
    }

    #[test]
    fn empty_batch_does_not_touch_the_model() {
        let classifier =
            EmbeddingClassifier::new(Arc::new(Mutex::new(KeywordEmbedder::default())), vocabulary())
                .expect("classifier loads");

        assert!(classifier.classify_batch(&[]).expect("empty batch").is_empty());
    }

    #[test]
    fn load_fails_when_the_embedder_fails() {
        let result = EmbeddingClassifier::new(Arc::new(Mutex::new(FailingEmbedder)), vocabulary());

        assert!(matches!(result, Err(ModelError::Inference(_))));
    }

    #[test]
    fn labels_are_embedded_once_across_batches() {
        let embedder = Arc::new(Mutex::new(KeywordEmbedder::default()));
        let classifier = EmbeddingClassifier::new(Arc::clone(&embedder), vocabulary())
            .expect("classifier loads");

        for text in ["software tester", "nursing officer", "account clerk"] {
            let labels = classifier
                .classify_batch(&[text.to_string(), text.to_string()])
                .expect("classification succeeds");
            assert_eq!(labels[0], labels[1]);
        }

        // Three labels up front, then only the six batch texts.
        assert_eq!(embedder.lock().expect("embedder mutex poisoned").embedded, 9);
    }
}

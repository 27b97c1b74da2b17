use crate::domain::posting::NewCategorizedPosting;
use crate::inference::{Classifier, ModelError};
use crate::processing::{Deadline, StageError};
use crate::processing::preprocess::{classification_input, normalize_text};
use crate::repository::{CategorizedPostingWriter, PostingReader};

/// Number of texts sent to the classifier at once.
pub const DEFAULT_BATCH_SIZE: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CategorizationStats {
    pub postings: usize,
    pub batches: usize,
    pub upserted: usize,
}

/// Categorize every stored posting and upsert the results.
///
/// Texts are classified `batch_size` at a time. Nothing is written until
/// every batch has been classified, and the write itself is a single
/// transaction, so a failed run leaves the categorized table untouched.
pub fn run_categorization_pipeline<R>(
    repo: &R,
    classifier: &dyn Classifier,
    batch_size: usize,
) -> Result<CategorizationStats, StageError>
where
    R: PostingReader + CategorizedPostingWriter,
{
    categorize_within(repo, classifier, batch_size, Deadline::unbounded())
}

/// [`run_categorization_pipeline`] bounded by `deadline`.
///
/// The deadline is checked before every batch and before the upsert. A
/// missed deadline fails the stage without writing anything.
pub fn categorize_within<R>(
    repo: &R,
    classifier: &dyn Classifier,
    batch_size: usize,
    deadline: Deadline,
) -> Result<CategorizationStats, StageError>
where
    R: PostingReader + CategorizedPostingWriter,
{
    let batch_size = batch_size.max(1);
    let mut stats = CategorizationStats::default();

    log::info!("Fetching postings to categorize");
    let postings = repo.list_postings()?;
    if postings.is_empty() {
        log::warn!("No data found in postings table");
        return Err(StageError::DataAbsent(
            "no postings to categorize".to_string(),
        ));
    }
    stats.postings = postings.len();

    let texts = postings
        .iter()
        .map(|posting| normalize_text(&classification_input(&posting.title, &posting.description)))
        .collect::<Vec<_>>();

    let mut categories = Vec::with_capacity(texts.len());
    for (index, batch) in texts.chunks(batch_size).enumerate() {
        let batch_number = index + 1;
        deadline.check()?;
        let labels = classifier.classify_batch(batch).map_err(|error| {
            log::error!("Inference failed on batch {batch_number}: {error}");
            StageError::BatchInference {
                batch: batch_number,
                error,
            }
        })?;

        if labels.len() != batch.len() {
            return Err(StageError::BatchInference {
                batch: batch_number,
                error: ModelError::OutputMismatch {
                    expected: batch.len(),
                    actual: labels.len(),
                },
            });
        }

        categories.extend(labels);
        stats.batches += 1;
    }

    let rows = postings
        .iter()
        .zip(categories)
        .map(|(posting, category)| NewCategorizedPosting::from_posting(posting, category))
        .collect::<Vec<_>>();

    deadline.check()?;
    log::info!("Upserting {} categorized postings", rows.len());
    stats.upserted = repo.upsert_categorized(&rows)?;

    Ok(stats)
}

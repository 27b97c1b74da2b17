use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::crawlers::CrawlerError;
use crate::inference::ModelError;
use crate::repository::errors::RepositoryError;

pub mod category;
pub mod ingest;
pub mod matching;
pub mod pipeline;
pub mod preprocess;

/// One sequential phase of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Scraping,
    Categorizing,
    Matching,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scraping => "Scraping",
            Stage::Categorizing => "Categorization",
            Stage::Matching => "Matching",
        };
        f.write_str(name)
    }
}

/// Failure of a whole stage. Record-level problems never surface here.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("collection from {site} failed: {error}")]
    Collection { site: String, error: CrawlerError },
    #[error("collection from {site} timed out after {after:?}")]
    CollectionTimeout { site: String, after: Duration },
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
    #[error("inference failed on batch {batch}: {error}")]
    BatchInference { batch: usize, error: ModelError },
    #[error("no input data: {0}")]
    DataAbsent(String),
    #[error("failed to persist matches for {} of {total} users", failures.len())]
    MatchPersistence {
        total: usize,
        failures: Vec<(i32, RepositoryError)>,
    },
    #[error("stage did not finish within {0:?}")]
    Timeout(Duration),
    #[error("stage task aborted: {0}")]
    Aborted(String),
}

/// The stage a run failed in, with its cause.
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct PipelineError {
    pub stage: Stage,
    pub error: StageError,
}

/// Time budget of a synchronous stage, checked by the stage itself before
/// each unit of model work and before every write.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget: Some(budget),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            started: Instant::now(),
            budget: None,
        }
    }

    pub fn check(&self) -> Result<(), StageError> {
        match self.budget {
            Some(budget) if self.started.elapsed() >= budget => Err(StageError::Timeout(budget)),
            _ => Ok(()),
        }
    }
}

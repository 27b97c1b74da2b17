use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::crawlers::JobCollector;
use crate::inference::ModelHandles;
use crate::models::config::PipelineConfig;
use crate::processing::category::{DEFAULT_BATCH_SIZE, categorize_within};
use crate::processing::ingest::run_ingestion;
use crate::processing::matching::{DEFAULT_TOP_N, save_matches_within};
use crate::processing::{Deadline, PipelineError, Stage, StageError};
use crate::repository::{
    CategorizedPostingReader, CategorizedPostingWriter, MatchWriter, PostingReader, PostingWriter,
    UserProfileReader,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    Scraping,
    Categorizing,
    Matching,
    Succeeded,
    Failed(Stage),
}

#[derive(Clone, Copy, Debug)]
pub struct PipelineSettings {
    pub top_n: usize,
    pub batch_size: usize,
    pub collector_timeout: Duration,
    pub stage_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            batch_size: DEFAULT_BATCH_SIZE,
            collector_timeout: Duration::from_secs(300),
            stage_timeout: Duration::from_secs(3600),
        }
    }
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            top_n: config.top_n,
            batch_size: config.batch_size,
            collector_timeout: config.collector_timeout(),
            stage_timeout: config.stage_timeout(),
        }
    }
}

/// Runs scraping, categorization and matching strictly in sequence and
/// stops at the first stage that fails.
///
/// One status line per stage is written to `status`. There is no resume:
/// every call to [`Pipeline::run`] starts again from scraping.
pub struct Pipeline<R, W> {
    repo: R,
    collectors: Vec<Box<dyn JobCollector>>,
    models: ModelHandles,
    settings: PipelineSettings,
    status: W,
    state: PipelineState,
}

impl<R, W> Pipeline<R, W>
where
    R: PostingReader
        + PostingWriter
        + CategorizedPostingReader
        + CategorizedPostingWriter
        + UserProfileReader
        + MatchWriter
        + Clone
        + Send
        + 'static,
    W: Write,
{
    pub fn new(
        repo: R,
        collectors: Vec<Box<dyn JobCollector>>,
        models: ModelHandles,
        settings: PipelineSettings,
        status: W,
    ) -> Self {
        Self {
            repo,
            collectors,
            models,
            settings,
            status,
            state: PipelineState::NotStarted,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn into_status(self) -> W {
        self.status
    }

    pub async fn run(&mut self) -> Result<(), PipelineError> {
        self.state = PipelineState::Scraping;
        log::info!("Running scrapers");
        match run_ingestion(&self.repo, &self.collectors, self.settings.collector_timeout).await {
            Ok(stats) => self.report(format!(
                "Scraping complete: {} new postings, {} already stored, {} skipped.",
                stats.created, stats.existing, stats.failed
            )),
            Err(error) => return Err(self.fail(Stage::Scraping, error)),
        }

        self.state = PipelineState::Categorizing;
        log::info!("Categorizing jobs");
        let repo = self.repo.clone();
        let classifier = Arc::clone(&self.models.classifier);
        let batch_size = self.settings.batch_size;
        let deadline = Deadline::after(self.settings.stage_timeout);
        match run_blocking(move || {
            categorize_within(&repo, classifier.as_ref(), batch_size, deadline)
        })
        .await
        {
            Ok(stats) => self.report(format!(
                "Categorization complete: {} postings in {} batches.",
                stats.postings, stats.batches
            )),
            Err(error) => return Err(self.fail(Stage::Categorizing, error)),
        }

        self.state = PipelineState::Matching;
        log::info!("Matching users to jobs");
        let repo = self.repo.clone();
        let scorer = Arc::clone(&self.models.scorer);
        let top_n = self.settings.top_n;
        let deadline = Deadline::after(self.settings.stage_timeout);
        match run_blocking(move || save_matches_within(&repo, scorer.as_ref(), top_n, deadline)).await
        {
            Ok(stats) => self.report(format!(
                "Matching complete: {} matches for {} users.",
                stats.matches_saved, stats.users
            )),
            Err(error) => return Err(self.fail(Stage::Matching, error)),
        }

        self.state = PipelineState::Succeeded;
        self.report("Pipeline finished successfully!".to_string());
        Ok(())
    }

    fn fail(&mut self, stage: Stage, error: StageError) -> PipelineError {
        self.state = PipelineState::Failed(stage);
        log::error!("{stage} failed: {error:?}");
        self.report(format!("{stage} failed: {error}"));
        self.report("Pipeline aborted.".to_string());
        PipelineError { stage, error }
    }

    fn report(&mut self, line: String) {
        if let Err(error) = writeln!(self.status, "{line}") {
            log::warn!("Failed to write status line: {error}");
        }
    }
}

/// Run a synchronous stage on the blocking pool and wait for it to finish.
/// The stage enforces its own [`Deadline`].
async fn run_blocking<T, F>(job: F) -> Result<T, StageError>
where
    F: FnOnce() -> Result<T, StageError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => result,
        Err(join_error) => Err(StageError::Aborted(join_error.to_string())),
    }
}

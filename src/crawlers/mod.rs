use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posting::RawJobRecord;

pub mod listing;
pub mod sites;

#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("failed to build crawler: {0}")]
    Build(String),
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
}

pub type CrawlerResult<T> = Result<T, CrawlerError>;

/// An abstraction over job boards that produce [`RawJobRecord`]s.
#[async_trait]
pub trait JobCollector: Send + Sync {
    /// Name stored as the `source` of every record.
    fn source(&self) -> &str;

    /// Collects every posting currently listed by the site.
    ///
    /// An unreachable site is an error; a reachable site with no postings
    /// yields an empty list.
    async fn collect(&self) -> CrawlerResult<Vec<RawJobRecord>>;
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.7103.94 Safari/537.36";

/// HTTP client shared by the collectors; every request is bounded by
/// `timeout`.
pub fn build_reqwest_client(timeout: Duration) -> CrawlerResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| CrawlerError::Build(e.to_string()))
}

use std::time::Duration;

use crate::crawlers::JobCollector;
use crate::domain::posting::{RawJobRecord, canonical_url};
use crate::processing::StageError;
use crate::repository::PostingWriter;
use crate::repository::errors::RepositoryResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Created,
    AlreadyExists,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

impl IngestStats {
    fn merge(&mut self, other: IngestStats) {
        self.created += other.created;
        self.existing += other.existing;
        self.failed += other.failed;
    }
}

/// Persist `record` unless a posting with the same canonical url exists.
///
/// The first write wins: an existing posting is never modified. Records
/// without a url cannot be deduplicated and are always created.
pub fn ingest<R>(repo: &R, record: &RawJobRecord) -> RepositoryResult<IngestOutcome>
where
    R: PostingWriter,
{
    let canonical = RawJobRecord {
        url: canonical_url(record.url.as_deref()),
        ..record.clone()
    };

    if repo.create_posting_if_absent(&canonical)? {
        Ok(IngestOutcome::Created)
    } else {
        Ok(IngestOutcome::AlreadyExists)
    }
}

/// Ingest every record, logging and skipping the ones the store rejects.
pub fn ingest_records<R>(repo: &R, records: &[RawJobRecord]) -> IngestStats
where
    R: PostingWriter,
{
    let mut stats = IngestStats::default();

    for record in records {
        match ingest(repo, record) {
            Ok(IngestOutcome::Created) => stats.created += 1,
            Ok(IngestOutcome::AlreadyExists) => stats.existing += 1,
            Err(error) => {
                stats.failed += 1;
                log::warn!(
                    "Failed to insert job {}: {error}",
                    record.url.as_deref().unwrap_or("<no url>")
                );
            }
        }
    }

    stats
}

/// Run every collector in order and ingest what it returns.
///
/// Each collector is awaited once under `timeout`. A failing or timed out
/// collector aborts the stage; postings already ingested from earlier
/// collectors stay in place.
pub async fn run_ingestion<R>(
    repo: &R,
    collectors: &[Box<dyn JobCollector>],
    timeout: Duration,
) -> Result<IngestStats, StageError>
where
    R: PostingWriter,
{
    let mut total = IngestStats::default();

    for collector in collectors {
        let site = collector.source().to_string();

        let records = match tokio::time::timeout(timeout, collector.collect()).await {
            Ok(Ok(records)) => records,
            Ok(Err(error)) => {
                log::error!("Collector {site} failed: {error}");
                return Err(StageError::Collection { site, error });
            }
            Err(_) => {
                log::error!("Collector {site} timed out after {timeout:?}");
                return Err(StageError::CollectionTimeout {
                    site,
                    after: timeout,
                });
            }
        };

        if records.is_empty() {
            log::warn!("No jobs were scraped from {site} to save.");
            continue;
        }

        let stats = ingest_records(repo, &records);
        log::info!(
            "Saved {} jobs from {site} ({} already present, {} failed)",
            stats.created,
            stats.existing,
            stats.failed
        );
        total.merge(stats);
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::{IngestOutcome, IngestStats, ingest, ingest_records, run_ingestion};
    use crate::crawlers::{CrawlerError, CrawlerResult, JobCollector};
    use crate::domain::posting::RawJobRecord;
    use crate::processing::StageError;
    use crate::repository::PostingWriter;
    use crate::repository::errors::{RepositoryError, RepositoryResult};

    #[derive(Default)]
    struct FakePostingRepo {
        urls: Mutex<HashSet<String>>,
        rows: Mutex<Vec<RawJobRecord>>,
        reject_title: Option<&'static str>,
    }

    impl FakePostingRepo {
        fn rows(&self) -> Vec<RawJobRecord> {
            self.rows.lock().expect("rows mutex poisoned").clone()
        }
    }

    impl PostingWriter for FakePostingRepo {
        fn create_posting_if_absent(&self, record: &RawJobRecord) -> RepositoryResult<bool> {
            if self.reject_title == Some(record.title.as_str()) {
                return Err(RepositoryError::Unexpected("injected write failure".to_string()));
            }
            if let Some(url) = &record.url
                && !self.urls.lock().expect("urls mutex poisoned").insert(url.clone())
            {
                return Ok(false);
            }
            self.rows.lock().expect("rows mutex poisoned").push(record.clone());
            Ok(true)
        }
    }

    fn record(title: &str, url: Option<&str>) -> RawJobRecord {
        RawJobRecord {
            title: title.to_string(),
            company: "Airtel".to_string(),
            location: "Lilongwe".to_string(),
            job_type: "Full Time".to_string(),
            date_posted: NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date"),
            url: url.map(str::to_string),
            source: "ntchito.com".to_string(),
            description: String::new(),
        }
    }

    struct StaticCollector {
        records: Vec<RawJobRecord>,
    }

    #[async_trait]
    impl JobCollector for StaticCollector {
        fn source(&self) -> &str {
            "static"
        }

        async fn collect(&self) -> CrawlerResult<Vec<RawJobRecord>> {
            Ok(self.records.clone())
        }
    }

    struct BrokenCollector;

    #[async_trait]
    impl JobCollector for BrokenCollector {
        fn source(&self) -> &str {
            "broken"
        }

        async fn collect(&self) -> CrawlerResult<Vec<RawJobRecord>> {
            Err(CrawlerError::Status {
                url: "https://broken.example/".to_string(),
                status: 503,
            })
        }
    }

    struct SlowCollector;

    #[async_trait]
    impl JobCollector for SlowCollector {
        fn source(&self) -> &str {
            "slow"
        }

        async fn collect(&self) -> CrawlerResult<Vec<RawJobRecord>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }
    }

    #[test]
    fn first_write_wins_for_equal_urls() {
        let repo = FakePostingRepo::default();

        let first = ingest(&repo, &record("Accountant", Some("https://a.mw/1"))).expect("ok");
        let second = ingest(&repo, &record("Renamed", Some("https://a.mw/1#apply"))).expect("ok");

        assert_eq!(first, IngestOutcome::Created);
        assert_eq!(second, IngestOutcome::AlreadyExists);
        assert_eq!(repo.rows().len(), 1);
        assert_eq!(repo.rows()[0].title, "Accountant");
    }

    #[test]
    fn records_without_url_are_always_created() {
        let repo = FakePostingRepo::default();

        let stats = ingest_records(&repo, &[record("A", None), record("A", Some("  "))]);

        assert_eq!(
            stats,
            IngestStats {
                created: 2,
                existing: 0,
                failed: 0
            }
        );
    }

    #[test]
    fn storage_failures_skip_only_the_failing_record() {
        let repo = FakePostingRepo {
            reject_title: Some("Broken"),
            ..Default::default()
        };

        let stats = ingest_records(
            &repo,
            &[
                record("A", Some("https://a.mw/a")),
                record("Broken", Some("https://a.mw/b")),
                record("C", Some("https://a.mw/c")),
            ],
        );

        assert_eq!(stats.created, 2);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn collector_failure_aborts_remaining_collectors() {
        let repo = FakePostingRepo::default();
        let collectors: Vec<Box<dyn JobCollector>> = vec![
            Box::new(StaticCollector {
                records: vec![record("A", Some("https://a.mw/a"))],
            }),
            Box::new(BrokenCollector),
            Box::new(StaticCollector {
                records: vec![record("B", Some("https://a.mw/b"))],
            }),
        ];

        let result = run_ingestion(&repo, &collectors, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(StageError::Collection { ref site, .. }) if site == "broken"));
        assert_eq!(repo.rows().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_collector_times_out() {
        let repo = FakePostingRepo::default();
        let collectors: Vec<Box<dyn JobCollector>> = vec![Box::new(SlowCollector)];

        let result = run_ingestion(&repo, &collectors, Duration::from_secs(1)).await;

        assert!(matches!(result, Err(StageError::CollectionTimeout { .. })));
    }

    #[tokio::test]
    async fn empty_collector_is_not_a_failure() {
        let repo = FakePostingRepo::default();
        let collectors: Vec<Box<dyn JobCollector>> =
            vec![Box::new(StaticCollector { records: vec![] })];

        let stats = run_ingestion(&repo, &collectors, Duration::from_secs(5))
            .await
            .expect("empty site is fine");

        assert_eq!(stats, IngestStats::default());
    }
}

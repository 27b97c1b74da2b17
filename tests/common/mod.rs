//! Helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use pushkind_jobs::crawlers::{CrawlerResult, JobCollector};
use pushkind_jobs::db::{DbPool, establish_connection_pool};
use pushkind_jobs::domain::matching::ScoreDecision;
use pushkind_jobs::domain::posting::RawJobRecord;
use pushkind_jobs::inference::{Classifier, ModelError, Scorer};
use pushkind_jobs::repository::DieselRepository;
use tempfile::TempDir;

/// Temporary database used in integration tests.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir.");
        let path = dir.path().join("test.db");
        let pool = establish_connection_pool(path.to_str().expect("utf8 temp path"))
            .expect("Failed to establish SQLite connection.");
        TestDb { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn insert_user(&self, qualifications: &str, skills: &str) -> i32 {
        use pushkind_jobs::schema::user_profiles;

        let mut conn = self
            .pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        diesel::insert_into(user_profiles::table)
            .values((
                user_profiles::qualifications.eq(qualifications),
                user_profiles::skills.eq(skills),
                user_profiles::about.eq("Motivated"),
                user_profiles::experience_years.eq(3),
            ))
            .returning(user_profiles::id)
            .get_result::<i32>(&mut conn)
            .expect("Failed to insert user profile.")
    }
}

pub fn record(title: &str, url: Option<&str>, description: &str) -> RawJobRecord {
    RawJobRecord {
        title: title.to_string(),
        company: "Illovo".to_string(),
        location: "Nchalo".to_string(),
        job_type: "Full Time".to_string(),
        date_posted: NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"),
        url: url.map(str::to_string),
        source: "jobsearchmalawi.com".to_string(),
        description: description.to_string(),
    }
}

pub struct StubCollector {
    pub records: Vec<RawJobRecord>,
}

#[async_trait]
impl JobCollector for StubCollector {
    fn source(&self) -> &str {
        "stub"
    }

    async fn collect(&self) -> CrawlerResult<Vec<RawJobRecord>> {
        Ok(self.records.clone())
    }
}

/// Gives every text the same label, or fails every batch.
pub struct FixedClassifier {
    pub label: Option<&'static str>,
}

impl Classifier for FixedClassifier {
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<String>, ModelError> {
        match self.label {
            Some(label) => Ok(texts.iter().map(|_| label.to_string()).collect()),
            None => Err(ModelError::Inference("model unavailable".to_string())),
        }
    }
}

/// Labels every text after sleeping for `delay`.
pub struct SlowClassifier {
    pub delay: Duration,
    pub label: &'static str,
}

impl Classifier for SlowClassifier {
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<String>, ModelError> {
        std::thread::sleep(self.delay);
        Ok(texts.iter().map(|_| self.label.to_string()).collect())
    }
}

/// Decides by job text; unknown texts are negative. Counts calls.
#[derive(Default)]
pub struct TableScorer {
    pub scores: HashMap<String, f32>,
    pub calls: Mutex<usize>,
}

impl TableScorer {
    pub fn new(scores: &[(&str, f32)]) -> Self {
        Self {
            scores: scores
                .iter()
                .map(|(text, score)| (text.to_string(), *score))
                .collect(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("calls mutex poisoned")
    }
}

impl Scorer for TableScorer {
    fn score(&self, _user_text: &str, job_text: &str) -> Result<ScoreDecision, ModelError> {
        *self.calls.lock().expect("calls mutex poisoned") += 1;
        Ok(match self.scores.get(job_text) {
            Some(score) => ScoreDecision {
                matched: true,
                score: Some(*score),
            },
            None => ScoreDecision {
                matched: false,
                score: Some(0.0),
            },
        })
    }
}

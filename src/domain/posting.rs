use chrono::{NaiveDate, NaiveDateTime};
use url::Url;

/// A job record as produced by a collector, before persistence.
#[derive(Clone, Debug, PartialEq)]
pub struct RawJobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub date_posted: NaiveDate,
    pub url: Option<String>,
    pub source: String,
    pub description: String,
}

/// A posting persisted by the ingestor. Unique by `url` when one is present.
#[derive(Clone, Debug, PartialEq)]
pub struct Posting {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub date_posted: NaiveDate,
    pub url: Option<String>,
    pub source: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

/// A posting together with the category assigned by the classifier.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorizedPosting {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub date_posted: NaiveDate,
    /// Empty when the source posting had no url.
    pub url: String,
    pub source: String,
    pub description: String,
    pub category: String,
}

/// Row written by the categorization stage.
///
/// Every field except `category` is part of the natural key, so an upsert
/// of the same listing only ever rewrites the category.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCategorizedPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub date_posted: NaiveDate,
    pub url: String,
    pub source: String,
    pub description: String,
    pub category: String,
}

impl NewCategorizedPosting {
    pub fn from_posting(posting: &Posting, category: String) -> Self {
        Self {
            title: posting.title.clone(),
            company: posting.company.clone(),
            location: posting.location.clone(),
            job_type: posting.job_type.clone(),
            date_posted: posting.date_posted,
            url: posting.url.clone().unwrap_or_default(),
            source: posting.source.clone(),
            description: posting.description.clone(),
            category,
        }
    }
}

/// Normalize a scraped link into the form used as the deduplication key.
///
/// Surrounding whitespace and the fragment are dropped. Values that do not
/// parse as absolute URLs are kept as trimmed text; blank values yield `None`.
pub fn canonical_url(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }

    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            Some(url.to_string())
        }
        Err(_) => Some(trimmed.to_string()),
    }
}

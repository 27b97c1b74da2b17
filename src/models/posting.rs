//! Diesel row types for the posting tables.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::posting::{
    CategorizedPosting as DomainCategorizedPosting, NewCategorizedPosting as DomainNewCategorized,
    Posting as DomainPosting, RawJobRecord,
};
use crate::schema::{categorized_postings, postings};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = postings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
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

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = postings)]
pub struct NewPosting {
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

impl NewPosting {
    /// Build an insertable row from a record whose url is already
    /// canonical.
    pub fn from_record(record: &RawJobRecord, created_at: NaiveDateTime) -> Self {
        Self {
            title: record.title.clone(),
            company: record.company.clone(),
            location: record.location.clone(),
            job_type: record.job_type.clone(),
            date_posted: record.date_posted,
            url: record.url.clone(),
            source: record.source.clone(),
            description: record.description.clone(),
            created_at,
        }
    }
}

impl From<Posting> for DomainPosting {
    fn from(row: Posting) -> Self {
        Self {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            job_type: row.job_type,
            date_posted: row.date_posted,
            url: row.url,
            source: row.source,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categorized_postings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategorizedPosting {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub date_posted: NaiveDate,
    pub url: String,
    pub source: String,
    pub description: String,
    pub category: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categorized_postings)]
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
    pub created_at: NaiveDateTime,
}

impl NewCategorizedPosting {
    pub fn from_domain(row: &DomainNewCategorized, created_at: NaiveDateTime) -> Self {
        Self {
            title: row.title.clone(),
            company: row.company.clone(),
            location: row.location.clone(),
            job_type: row.job_type.clone(),
            date_posted: row.date_posted,
            url: row.url.clone(),
            source: row.source.clone(),
            description: row.description.clone(),
            category: row.category.clone(),
            created_at,
        }
    }
}

impl From<CategorizedPosting> for DomainCategorizedPosting {
    fn from(row: CategorizedPosting) -> Self {
        Self {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            job_type: row.job_type,
            date_posted: row.date_posted,
            url: row.url,
            source: row.source,
            description: row.description,
            category: row.category,
        }
    }
}

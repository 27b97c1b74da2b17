use crate::db::{DbConnection, DbPool};
use crate::domain::matching::{Match, RankedMatch};
use crate::domain::posting::{CategorizedPosting, NewCategorizedPosting, Posting, RawJobRecord};
use crate::domain::user::UserProfile;
use crate::repository::errors::RepositoryResult;

pub mod categorized;
pub mod errors;
pub mod matching;
pub mod posting;
pub mod user;

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

pub trait PostingReader {
    /// All postings in ascending id order.
    fn list_postings(&self) -> RepositoryResult<Vec<Posting>>;
    fn count_postings(&self) -> RepositoryResult<i64>;
}

pub trait PostingWriter {
    /// Insert `record` unless a posting with the same url exists.
    ///
    /// Returns `true` when a row was created. Records without a url are
    /// always inserted.
    fn create_posting_if_absent(&self, record: &RawJobRecord) -> RepositoryResult<bool>;
}

pub trait CategorizedPostingReader {
    /// The categorized corpus in ascending id order.
    fn list_categorized_postings(&self) -> RepositoryResult<Vec<CategorizedPosting>>;
}

pub trait CategorizedPostingWriter {
    /// Upsert every row by natural key in one transaction, rewriting only the
    /// category of rows that already exist.
    fn upsert_categorized(&self, rows: &[NewCategorizedPosting]) -> RepositoryResult<usize>;
}

pub trait UserProfileReader {
    fn list_user_profiles(&self) -> RepositoryResult<Vec<UserProfile>>;
}

pub trait MatchReader {
    /// Matches of one user ordered by rank.
    fn list_matches(&self, user_id: i32) -> RepositoryResult<Vec<Match>>;
}

pub trait MatchWriter {
    /// Atomically replace the whole match set of `user_id`.
    fn replace_matches(&self, user_id: i32, ranked: &[RankedMatch]) -> RepositoryResult<usize>;
}

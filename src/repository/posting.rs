use chrono::Utc;
use diesel::prelude::*;

use crate::domain::posting::{Posting, RawJobRecord};
use crate::models::posting::{NewPosting, Posting as DbPosting};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, PostingReader, PostingWriter};

impl PostingReader for DieselRepository {
    fn list_postings(&self) -> RepositoryResult<Vec<Posting>> {
        use crate::schema::postings;

        let mut conn = self.conn()?;

        let rows = postings::table
            .order(postings::id.asc())
            .select(DbPosting::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Posting::from).collect())
    }

    fn count_postings(&self) -> RepositoryResult<i64> {
        use crate::schema::postings;

        let mut conn = self.conn()?;

        Ok(postings::table.count().get_result(&mut conn)?)
    }
}

impl PostingWriter for DieselRepository {
    fn create_posting_if_absent(&self, record: &RawJobRecord) -> RepositoryResult<bool> {
        use crate::schema::postings;

        let mut conn = self.conn()?;
        let row = NewPosting::from_record(record, Utc::now().naive_utc());

        // The unique index on `url` decides; NULL urls never conflict.
        let inserted = diesel::insert_into(postings::table)
            .values(&row)
            .on_conflict(postings::url)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(inserted > 0)
    }
}
